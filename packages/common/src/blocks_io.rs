use crate::error::CommonError;
use crate::result::CommonResult;
use quire_model::Block;
use serde_json::Value;
use std::path::Path;

/// Read a chapter's Block list from a JSON file.
///
/// Accepts either a bare array or an object with a `blocks` array.
pub fn read_blocks(path: &Path) -> CommonResult<Vec<Block>> {
    let content = std::fs::read_to_string(path)?;
    parse_blocks(&content)
}

pub fn parse_blocks(content: &str) -> CommonResult<Vec<Block>> {
    let value: Value = serde_json::from_str(content)?;
    let blocks = match value {
        Value::Object(mut map) => map
            .remove("blocks")
            .ok_or(CommonError::NotABlockList("an object without `blocks`"))?,
        array @ Value::Array(_) => array,
        Value::String(_) => return Err(CommonError::NotABlockList("a string")),
        _ => return Err(CommonError::NotABlockList("a scalar")),
    };
    Ok(serde_json::from_value(blocks)?)
}

pub fn write_blocks(path: &Path, blocks: &[Block]) -> CommonResult<()> {
    let content = serde_json::to_string_pretty(blocks)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_model::BlockType;

    #[test]
    fn test_parse_bare_array_and_wrapped_object() {
        let bare = r#"[{ "id": "a", "blockType": "describe", "text": "Hi" }]"#;
        let wrapped = r#"{ "title": "Ch. 1", "blocks": [{ "id": "a", "blockType": "describe" }] }"#;

        assert_eq!(parse_blocks(bare).unwrap()[0].text, "Hi");
        assert_eq!(parse_blocks(wrapped).unwrap()[0].id, "a");
    }

    #[test]
    fn test_write_then_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chapter.json");
        let blocks = vec![Block::text_block("a", BlockType::Comment, "note")];

        write_blocks(&path, &blocks).unwrap();
        assert_eq!(read_blocks(&path).unwrap(), blocks);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(matches!(parse_blocks("{ not json"), Err(CommonError::Json(_))));
        assert!(matches!(
            parse_blocks(r#"{ "title": "Ch. 1" }"#),
            Err(CommonError::NotABlockList(_))
        ));
        assert!(matches!(parse_blocks("42"), Err(CommonError::NotABlockList(_))));
    }
}
