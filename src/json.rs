//! JSON serialization of conversion results.

use crate::error::{Error, Result};
use crate::model::Conversion;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonFormat {
    /// Indented output
    Pretty,
    /// Single-line output
    Compact,
}

/// Serialize a conversion result (markdown, stats, warnings) to JSON.
pub fn to_json(conversion: &Conversion, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(conversion),
        JsonFormat::Compact => serde_json::to_string(conversion),
    };
    result.map_err(|e| Error::Internal(format!("JSON serialization failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DocumentStats;

    #[test]
    fn test_round_trip() {
        let conversion = Conversion {
            markdown: "# Hi".to_string(),
            stats: DocumentStats {
                word_count: 1,
                heading_count: 1,
                ..Default::default()
            },
            warnings: vec![],
            advisories: vec![],
        };

        let compact = to_json(&conversion, JsonFormat::Compact).unwrap();
        assert!(!compact.contains('\n'));

        let parsed: Conversion = serde_json::from_str(&compact).unwrap();
        assert_eq!(parsed.markdown, "# Hi");
        assert_eq!(parsed.stats.heading_count, 1);
    }
}
