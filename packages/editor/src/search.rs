//! Chapter-local search and seeding from index-service hits.

use crate::plugins::highlight::Match;
use quire_model::Document;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOptions {
    #[serde(default)]
    pub case_sensitive: bool,
}

/// One ranked hit from the search index service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub episode_id: String,
    pub content: String,
    /// Block order within the episode.
    pub index: usize,
}

fn fold(c: char, options: SearchOptions) -> char {
    if options.case_sensitive {
        c
    } else {
        c.to_lowercase().next().unwrap_or(c)
    }
}

/// Char offsets of non-overlapping occurrences of `query` in `text`.
fn occurrences(text: &str, query: &[char], options: SearchOptions) -> Vec<usize> {
    let hay: Vec<char> = text.chars().map(|c| fold(c, options)).collect();
    let mut found = Vec::new();
    if query.is_empty() || query.len() > hay.len() {
        return found;
    }
    let mut i = 0;
    while i + query.len() <= hay.len() {
        if hay[i..i + query.len()] == *query {
            found.push(i);
            i += query.len();
        } else {
            i += 1;
        }
    }
    found
}

fn fold_query(query: &str, options: SearchOptions) -> Vec<char> {
    query.chars().map(|c| fold(c, options)).collect()
}

fn block_matches(doc: &Document, index: usize, query: &[char], options: SearchOptions) -> Vec<Match> {
    let block = &doc.blocks[index];
    if !block.is_textblock() {
        return Vec::new();
    }
    let start = doc.content_start(index);
    occurrences(&block.text_content(), query, options)
        .into_iter()
        .map(|offset| Match {
            from: start + offset,
            to: start + offset + query.len(),
        })
        .collect()
}

/// Every occurrence of `query` in the document's textblocks, in document
/// order. Matches never cross block boundaries.
pub fn find_matches(doc: &Document, query: &str, options: SearchOptions) -> Vec<Match> {
    let query = fold_query(query, options);
    (0..doc.blocks.len())
        .flat_map(|index| block_matches(doc, index, &query, options))
        .collect()
}

/// Matches for the hits that belong to the open chapter.
///
/// A hit's `index` points at a block by order; when that block no longer
/// holds the hit's content (the chapter changed since indexing) the block is
/// looked up by text instead. Hits that resolve to nothing are skipped.
pub fn matches_from_hits(
    doc: &Document,
    chapter_id: &str,
    hits: &[SearchHit],
    query: &str,
    options: SearchOptions,
) -> Vec<Match> {
    let folded = fold_query(query, options);
    let mut indices: Vec<usize> = hits
        .iter()
        .filter(|hit| hit.episode_id == chapter_id)
        .filter_map(|hit| {
            let holds = |i: usize| doc.blocks[i].text_content() == hit.content;
            if hit.index < doc.blocks.len() && holds(hit.index) {
                Some(hit.index)
            } else {
                (0..doc.blocks.len()).find(|&i| holds(i))
            }
        })
        .collect();
    indices.sort_unstable();
    indices.dedup();

    let mut matches: Vec<Match> = indices
        .into_iter()
        .flat_map(|index| block_matches(doc, index, &folded, options))
        .collect();
    matches.sort_by_key(|m| m.from);
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_model::{BlockAttrs, BlockNode, BlockType, TextRun};

    fn doc() -> Document {
        Document::new(vec![
            BlockNode::textblock(BlockType::Narration, Some("a".into()), vec![TextRun::plain("The rain, the RAIN")]),
            BlockNode::leaf(BlockType::Divider, Some("d".into()), BlockAttrs::None),
            BlockNode::textblock(BlockType::Dialogue, Some("b".into()), vec![TextRun::plain("“Rain again”")]),
        ])
    }

    #[test]
    fn test_case_insensitive_by_default() {
        let matches = find_matches(&doc(), "rain", SearchOptions::default());
        // block 0 content starts at 1; block 2 content starts at 22
        assert_eq!(
            matches,
            vec![
                Match { from: 5, to: 9 },
                Match { from: 15, to: 19 },
                Match { from: 23, to: 27 },
            ]
        );
    }

    #[test]
    fn test_case_sensitive() {
        let options = SearchOptions {
            case_sensitive: true,
        };
        let matches = find_matches(&doc(), "RAIN", options);
        assert_eq!(matches, vec![Match { from: 15, to: 19 }]);
    }

    #[test]
    fn test_non_overlapping() {
        let doc = Document::new(vec![BlockNode::textblock(
            BlockType::Narration,
            None,
            vec![TextRun::plain("aaaa")],
        )]);
        assert_eq!(find_matches(&doc, "aa", SearchOptions::default()).len(), 2);
        assert!(find_matches(&doc, "", SearchOptions::default()).is_empty());
    }

    #[test]
    fn test_hits_for_other_chapters_are_ignored() {
        let hits = vec![
            SearchHit {
                episode_id: "ch-1".into(),
                content: "“Rain again”".into(),
                index: 2,
            },
            SearchHit {
                episode_id: "ch-2".into(),
                content: "The rain, the RAIN".into(),
                index: 0,
            },
        ];
        let matches = matches_from_hits(&doc(), "ch-1", &hits, "rain", SearchOptions::default());
        assert_eq!(matches, vec![Match { from: 23, to: 27 }]);
    }

    #[test]
    fn test_stale_hit_index_falls_back_to_text() {
        let hits = vec![SearchHit {
            episode_id: "ch-1".into(),
            content: "The rain, the RAIN".into(),
            index: 7,
        }];
        let matches = matches_from_hits(&doc(), "ch-1", &hits, "rain", SearchOptions::default());
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].from, 5);
    }
}
