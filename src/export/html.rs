//! # HTML 报告
//!
//! 将激发态表格与自然跃迁轨道 (NTO) 图片组合为单个 HTML 文件。
//!
//! ## 图片命名
//! `NTO{state}{irrep}_{pair}{o|v}_{weight}.png`，例如 `NTO3a_1o_0.85.png`。
//! 权重低于 0.2 的 NTO 对被忽略；占据 (o) 与空 (v) 图片成对显示。
//!
//! ## 依赖关系
//! - 被 `commands/export.rs` 调用
//! - 使用 `export/table.rs` 的行格式
//! - 使用 `walkdir` 扫描图片目录, `regex` 解析文件名, `quick-xml` 转义

use crate::error::{Result, TdError};
use crate::export::table::{self, HEADER};
use crate::models::ExcitedState;
use crate::parsers::{compile, OrbitalLabels};

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const NTO_PATTERN: &str = r#"^NTO(\d+)([\w'"]+)_(\d+)(o|v)_([\d.]+)\.png$"#;

/// NTO 权重下限
pub const MIN_NTO_WEIGHT: f64 = 0.2;

/// 一对 NTO 图片
#[derive(Debug, Clone, PartialEq)]
pub struct NtoPair {
    pub irrep: String,
    pub pair: u32,
    pub weight: f64,
    pub occupied: PathBuf,
    pub virtual_: PathBuf,
}

/// NTO 图片按 (态编号, 小写不可约表示) 归组；TURBOMOLE 的态编号在各不可约表示内重新计数
pub type NtoKey = (usize, String);

/// 某个激发态对应的 NTO 键
pub fn nto_key(es: &ExcitedState) -> NtoKey {
    (es.id, es.irrep.to_lowercase())
}

/// 转义 HTML 文本
pub fn escape_html(s: &str) -> String {
    quick_xml::escape::escape(s).into_owned()
}

/// 扫描图片目录：(态编号, 不可约表示) -> NTO 对（按权重降序）
pub fn collect_ntos(image_dir: &Path) -> Result<BTreeMap<NtoKey, Vec<NtoPair>>> {
    let nto_re = compile(NTO_PATTERN)?;

    // (state, irrep, pair) -> (weight, occupied, virtual)
    let mut halves: BTreeMap<(usize, String, u32), (f64, Option<PathBuf>, Option<PathBuf>)> = BTreeMap::new();

    for entry in WalkDir::new(image_dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let name = entry.file_name().to_string_lossy();
        let Some(caps) = nto_re.captures(&name) else {
            continue;
        };
        let (Ok(state), Ok(pair), Ok(weight)) = (
            caps[1].parse::<usize>(),
            caps[3].parse::<u32>(),
            caps[5].trim_end_matches('.').parse::<f64>(),
        ) else {
            log::warn!("Ignoring NTO image with unreadable name '{}'", name);
            continue;
        };
        if weight < MIN_NTO_WEIGHT {
            continue;
        }

        let slot = halves
            .entry((state, caps[2].to_lowercase(), pair))
            .or_insert((weight, None, None));
        if &caps[4] == "o" {
            slot.1 = Some(entry.path().to_path_buf());
        } else {
            slot.2 = Some(entry.path().to_path_buf());
        }
    }

    let mut ntos: BTreeMap<NtoKey, Vec<NtoPair>> = BTreeMap::new();
    for ((state, irrep, pair), (weight, occupied, virtual_)) in halves {
        match (occupied, virtual_) {
            (Some(occupied), Some(virtual_)) => ntos.entry((state, irrep.clone())).or_default().push(NtoPair {
                irrep,
                pair,
                weight,
                occupied,
                virtual_,
            }),
            _ => log::warn!("Unpaired NTO image for state {}{} pair {}", state, irrep, pair),
        }
    }
    for pairs in ntos.values_mut() {
        pairs.sort_by(|a, b| {
            b.weight
                .partial_cmp(&a.weight)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.pair.cmp(&b.pair))
        });
    }

    Ok(ntos)
}

/// 生成 HTML 文本
pub fn render_report(
    states: &[ExcitedState],
    labels: &OrbitalLabels,
    ntos: &BTreeMap<NtoKey, Vec<NtoPair>>,
    title: &str,
) -> String {
    let cell = |s: &str| {
        s.split('\n')
            .map(escape_html)
            .collect::<Vec<_>>()
            .join("<br>")
    };

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_html(title)));
    html.push_str("<style>table{border-collapse:collapse}td,th{border:1px solid #999;padding:4px 8px}img{max-width:300px}</style>\n");
    html.push_str("</head>\n<body>\n");
    html.push_str(&format!("<h1>{}</h1>\n", escape_html(title)));

    html.push_str("<table>\n<tr>");
    for h in HEADER {
        html.push_str(&format!("<th>{}</th>", escape_html(h)));
    }
    html.push_str("</tr>\n");
    for row in table::format_rows(states, labels, "\n") {
        html.push_str("<tr>");
        for c in row.cells() {
            html.push_str(&format!("<td>{}</td>", cell(c)));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</table>\n");

    for es in states {
        let Some(pairs) = ntos.get(&nto_key(es)) else {
            continue;
        };
        html.push_str(&format!(
            "<h2>S{} ({}) {:.2} eV, {:.1} nm, f = {:.4}</h2>\n",
            es.id,
            escape_html(&es.irrep),
            es.energy_ev,
            es.wavelength_nm(),
            es.osc
        ));
        html.push_str("<table>\n");
        for pair in pairs {
            html.push_str(&format!(
                "<tr><td>{:.0}%</td><td><img src=\"{}\" alt=\"occupied NTO\"></td><td><img src=\"{}\" alt=\"virtual NTO\"></td></tr>\n",
                pair.weight * 100.0,
                escape_html(&pair.occupied.display().to_string()),
                escape_html(&pair.virtual_.display().to_string())
            ));
        }
        html.push_str("</table>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

/// 写出 HTML 报告；图片目录不存在时只输出表格
pub fn write_report(
    states: &[ExcitedState],
    labels: &OrbitalLabels,
    image_dir: &Path,
    output_path: &Path,
    title: &str,
) -> Result<()> {
    let ntos = if image_dir.is_dir() {
        collect_ntos(image_dir)?
    } else {
        log::warn!(
            "NTO image directory '{}' not found; report contains the table only",
            image_dir.display()
        );
        BTreeMap::new()
    };

    let html = render_report(states, labels, &ntos, title);
    fs::write(output_path, html).map_err(|e| TdError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_collect_ntos() {
        let dir = tempdir().unwrap();
        for name in [
            "NTO1a_1o_0.85.png",
            "NTO1a_1v_0.85.png",
            "NTO1a_2o_0.10.png",
            "NTO1a_2v_0.10.png",
            "NTO2a_1o_0.60.png",
            "unrelated.png",
        ] {
            std::fs::write(dir.path().join(name), b"png").unwrap();
        }

        let ntos = collect_ntos(dir.path()).unwrap();
        let first = &ntos[&(1, "a".to_string())];
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].pair, 1);
        assert!((first[0].weight - 0.85).abs() < 1e-12);
        assert!(first[0].occupied.ends_with("NTO1a_1o_0.85.png"));
        // 缺少 v 图片
        assert!(!ntos.contains_key(&(2, "a".to_string())));
    }

    #[test]
    fn test_render_escapes() {
        let states = vec![ExcitedState::new(1, "singlet", "<a>", 4.5, 0.1)];
        let mut ntos = BTreeMap::new();
        ntos.insert(
            (1, "<a>".to_string()),
            vec![NtoPair {
                irrep: "a".to_string(),
                pair: 1,
                weight: 0.85,
                occupied: PathBuf::from("img/NTO1a_1o_0.85.png"),
                virtual_: PathBuf::from("img/NTO1a_1v_0.85.png"),
            }],
        );
        let html = render_report(&states, &OrbitalLabels::empty(), &ntos, "A & B");
        assert!(html.contains("<title>A &amp; B</title>"));
        assert!(html.contains("S1 (&lt;a&gt;)"));
        assert!(html.contains("src=\"img/NTO1a_1o_0.85.png\""));
        assert!(html.contains("<td>85%</td>"));
    }

    #[test]
    fn test_write_report_without_images() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("report.html");
        let states = vec![ExcitedState::new(1, "singlet", "A", 4.5, 0.1)];
        write_report(&states, &OrbitalLabels::empty(), &dir.path().join("missing"), &out, "job").unwrap();
        let html = std::fs::read_to_string(&out).unwrap();
        assert!(html.contains("<td>S1</td>"));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn test_ntos_follow_irrep() {
        let dir = tempdir().unwrap();
        for name in ["NTO1a_1o_0.90.png", "NTO1a_1v_0.90.png", "NTO1B1_1o_0.70.png", "NTO1B1_1v_0.70.png"] {
            std::fs::write(dir.path().join(name), b"png").unwrap();
        }
        let ntos = collect_ntos(dir.path()).unwrap();
        assert_eq!(ntos.len(), 2);

        let states = vec![
            ExcitedState::new(1, "singlet", "a", 4.5, 0.1),
            ExcitedState::new(1, "singlet", "b1", 5.0, 0.2),
        ];
        let html = render_report(&states, &OrbitalLabels::empty(), &ntos, "job");
        let (a_part, b1_part) = html.split_at(html.find("S1 (b1)").unwrap());
        assert!(a_part.contains("NTO1a_1o_0.90.png"));
        assert!(!a_part.contains("NTO1B1_1o"));
        assert!(b1_part.contains("NTO1B1_1o_0.70.png"));
        assert!(!b1_part.contains("NTO1a_1o"));
    }
}
