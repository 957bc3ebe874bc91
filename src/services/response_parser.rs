//! 模型响应解析
//!
//! 约定格式：`<批改后的文本>Feedback: <一句说明>`，标记可能缺失

/// 分隔批改文本与说明的标记
pub const FEEDBACK_MARKER: &str = "Feedback:";

/// 模型没有给出说明时使用的默认说明
pub const DEFAULT_FEEDBACK: &str = "Fixed grammar and clarity.";

/// 解析结果
///
/// `corrected` 为 `None` 表示模型没有给出任何批改文本，由调用方决定如何回退
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResponse {
    pub corrected: Option<String>,
    pub feedback: String,
}

impl ParsedResponse {
    pub fn is_empty(&self) -> bool {
        self.corrected.is_none()
    }
}

/// 按第一个 `Feedback:` 标记切分模型输出
///
/// 只做首尾空白裁剪，不改大小写和标点
pub fn parse(raw: &str) -> ParsedResponse {
    let (corrected, feedback) = match raw.split_once(FEEDBACK_MARKER) {
        Some((before, after)) => (before.trim(), after.trim()),
        None => (raw.trim(), ""),
    };

    ParsedResponse {
        corrected: (!corrected.is_empty()).then(|| corrected.to_string()),
        feedback: if feedback.is_empty() {
            DEFAULT_FEEDBACK.to_string()
        } else {
            feedback.to_string()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_marker() {
        let parsed = parse("This is my first test sentence.Feedback: Fixed a spelling error.");
        assert_eq!(
            parsed,
            ParsedResponse {
                corrected: Some("This is my first test sentence.".to_string()),
                feedback: "Fixed a spelling error.".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_trims_both_segments() {
        let parsed = parse("  \n The cat sat.  Feedback:   Added a period. \n");
        assert_eq!(parsed.corrected.as_deref(), Some("The cat sat."));
        assert_eq!(parsed.feedback, "Added a period.");
    }

    #[test]
    fn test_parse_without_marker_uses_default_feedback() {
        let parsed = parse("  The cat sat on the mat. ");
        assert_eq!(parsed.corrected.as_deref(), Some("The cat sat on the mat."));
        assert_eq!(parsed.feedback, DEFAULT_FEEDBACK);
    }

    #[test]
    fn test_parse_splits_on_first_marker_only() {
        let parsed = parse("Text Feedback: first Feedback: second");
        assert_eq!(parsed.corrected.as_deref(), Some("Text"));
        assert_eq!(parsed.feedback, "first Feedback: second");
    }

    #[test]
    fn test_parse_keeps_casing_and_punctuation() {
        let parsed = parse("hELLO ,world!!Feedback:ok");
        assert_eq!(parsed.corrected.as_deref(), Some("hELLO ,world!!"));
        assert_eq!(parsed.feedback, "ok");
    }

    #[test]
    fn test_parse_signals_empty_correction() {
        for raw in ["", "   \n\t", "   Feedback: Only a note.", "Feedback:"] {
            let parsed = parse(raw);
            assert!(parsed.is_empty(), "expected empty correction for {raw:?}");
            assert!(!parsed.feedback.is_empty());
        }
        assert_eq!(parse("   Feedback: Only a note.").feedback, "Only a note.");
    }

    #[test]
    fn test_parse_blank_feedback_falls_back_to_default() {
        let parsed = parse("Corrected text. Feedback:    ");
        assert_eq!(parsed.corrected.as_deref(), Some("Corrected text."));
        assert_eq!(parsed.feedback, DEFAULT_FEEDBACK);
    }

    #[test]
    fn test_parse_is_case_sensitive_on_marker() {
        let parsed = parse("Text feedback: lower case");
        assert_eq!(parsed.corrected.as_deref(), Some("Text feedback: lower case"));
        assert_eq!(parsed.feedback, DEFAULT_FEEDBACK);
    }
}
