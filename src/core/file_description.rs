//! Metadata of the behaviour source file, copied into generated headers.

use serde::{Deserialize, Serialize};

/// Metadata of the file a behaviour was read from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDescription {
    /// Name of the behaviour file
    pub file_name: String,
    pub author: String,
    pub date: String,
    pub description: String,
}

impl FileDescription {
    pub fn new(file_name: impl Into<String>) -> Self {
        FileDescription {
            file_name: file_name.into(),
            ..Default::default()
        }
    }

    /// Doxygen-style banner placed at the top of generated files.
    pub fn banner(&self, generated_file: &str, brief: &str) -> Vec<String> {
        let mut lines = vec![
            "/*!".to_string(),
            format!(" * \\file   {}", generated_file),
            format!(" * \\brief  {}", brief),
        ];
        if !self.file_name.is_empty() {
            lines.push(format!(" *         generated from {}", self.file_name));
        }
        if !self.author.is_empty() {
            lines.push(format!(" * \\author {}", self.author));
        }
        if !self.date.is_empty() {
            lines.push(format!(" * \\date   {}", self.date));
        }
        for l in self.description.lines() {
            lines.push(format!(" * {}", l).trim_end().to_string());
        }
        lines.push(" */".to_string());
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_skips_empty_fields() {
        let fd = FileDescription::new("Norton.mfront");
        let banner = fd.banner("src/ansysNorton.cxx", "ansys interface");
        assert_eq!(banner.first().unwrap(), "/*!");
        assert!(banner.iter().any(|l| l.contains("Norton.mfront")));
        assert!(!banner.iter().any(|l| l.contains("\\author")));
    }
}
