//! # 轨道名称映射文件
//!
//! 将原始轨道标识（编号 + 不可约表示）映射为易读名称，例如 `π(C=C)`。
//!
//! ## 支持格式
//! - JSON (`mos.json`): `{"45 a": "π(C=C)", "46 a": "π*(C=C)"}`
//! - 制表符分隔 (`<stem>_mos.csv`): `45<TAB>π(C=C)`，与对称性无关
//!
//! 文件或键缺失都不是错误：调用方回退到原始轨道编号。
//!
//! ## 依赖关系
//! - 被 `commands/` 和 `export/` 使用
//! - 使用 `serde_json`, `csv`

use crate::error::{Result, TdError};
use crate::models::Orbital;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// 轨道名称表
#[derive(Debug, Clone, Default)]
pub struct OrbitalLabels {
    /// (轨道编号, 小写不可约表示；空串表示任意对称性) -> 名称
    labels: HashMap<(u32, String), String>,
}

impl OrbitalLabels {
    /// 空表
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// 插入一条映射，`irrep` 为空时对所有对称性生效
    pub fn insert(&mut self, number: u32, irrep: &str, label: impl Into<String>) {
        self.labels
            .insert((number, irrep.to_lowercase()), label.into());
    }

    /// 查找名称：先精确匹配对称性，再匹配与对称性无关的条目
    pub fn get(&self, number: u32, irrep: &str) -> Option<&str> {
        self.labels
            .get(&(number, irrep.to_lowercase()))
            .or_else(|| self.labels.get(&(number, String::new())))
            .map(|s| s.as_str())
    }

    pub fn get_orbital(&self, orbital: &Orbital) -> Option<&str> {
        self.get(orbital.number, &orbital.irrep)
    }

    /// 加载映射文件（根据扩展名选择 JSON 或制表符格式）
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TdError::MissingLabelFile {
                path: path.display().to_string(),
            });
        }
        let content = fs::read_to_string(path).map_err(|e| TdError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json {
            Self::from_json(&content)
        } else {
            Self::from_tsv(&content)
        }
    }

    /// 解析 JSON 映射，键为 "编号 对称性"
    pub fn from_json(content: &str) -> Result<Self> {
        let raw: HashMap<String, String> = serde_json::from_str(content)?;
        let mut labels = Self::empty();

        for (key, label) in raw {
            let mut parts = key.split_whitespace();
            let number = parts.next().and_then(|n| n.parse::<u32>().ok());
            match number {
                Some(number) => labels.insert(number, parts.next().unwrap_or_default(), label),
                None => log::warn!("Ignoring orbital label with invalid key '{}'", key),
            }
        }

        Ok(labels)
    }

    /// 解析制表符分隔映射
    pub fn from_tsv(content: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_bytes());

        let mut labels = Self::empty();
        for record in reader.records() {
            let record = record?;
            let (Some(number), Some(label)) = (record.get(0), record.get(1)) else {
                continue;
            };
            match number.trim().parse::<u32>() {
                Ok(n) => labels.insert(n, "", label.trim()),
                Err(_) => log::warn!("Ignoring orbital label row '{}'", number),
            }
        }

        Ok(labels)
    }

    /// 在输出文件旁查找映射文件：`<stem>_mos.csv`，其次 `mos.json`
    pub fn discover(log_path: &Path) -> Option<PathBuf> {
        let dir = log_path.parent().unwrap_or_else(|| Path::new(""));
        let stem = log_path.file_stem().and_then(|s| s.to_str())?;

        [dir.join(format!("{}_mos.csv", stem)), dir.join("mos.json")]
            .into_iter()
            .find(|p| p.exists())
    }

    /// 加载显式指定或自动发现的映射文件；任何失败都回退到空表
    pub fn load_or_empty(explicit: Option<&Path>, log_path: &Path) -> Self {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => match Self::discover(log_path) {
                Some(p) => p,
                None => {
                    log::info!("No orbital label file found next to '{}'", log_path.display());
                    return Self::empty();
                }
            },
        };

        match Self::load(&path) {
            Ok(labels) if labels.is_empty() => {
                log::warn!("Orbital label file '{}' contains no labels", path.display());
                labels
            }
            Ok(labels) => {
                log::info!("Loaded {} orbital labels from '{}'", labels.len(), path.display());
                labels
            }
            Err(e) => {
                log::warn!("{}; using raw orbital numbers", e);
                Self::empty()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_from_json() {
        let labels = OrbitalLabels::from_json(r#"{"45 a": "pi", "46 b1": "pi*"}"#).unwrap();
        assert_eq!(labels.get(45, "a"), Some("pi"));
        assert_eq!(labels.get(46, "B1"), Some("pi*"));
        assert_eq!(labels.get(46, "a"), None);
        assert_eq!(labels.get(47, "a"), None);
    }

    #[test]
    fn test_from_tsv_is_irrep_independent() {
        let labels = OrbitalLabels::from_tsv("45\tn(O)\n46\tpi*\n").unwrap();
        assert_eq!(labels.get(45, "a"), Some("n(O)"));
        assert_eq!(labels.get(46, "A"), Some("pi*"));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("job.log");
        let missing = dir.path().join("nope.json");

        assert!(matches!(
            OrbitalLabels::load(&missing),
            Err(TdError::MissingLabelFile { .. })
        ));
        assert!(OrbitalLabels::load_or_empty(Some(&missing), &log).is_empty());
        assert!(OrbitalLabels::load_or_empty(None, &log).is_empty());
    }

    #[test]
    fn test_discover_prefers_stem_csv() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("job.log");
        let mut f = std::fs::File::create(dir.path().join("job_mos.csv")).unwrap();
        writeln!(f, "12\tsigma").unwrap();
        std::fs::write(dir.path().join("mos.json"), r#"{"12 a": "other"}"#).unwrap();

        let found = OrbitalLabels::discover(&log).unwrap();
        assert!(found.ends_with("job_mos.csv"));

        let labels = OrbitalLabels::load_or_empty(None, &log);
        assert_eq!(labels.get(12, "a"), Some("sigma"));
    }
}
