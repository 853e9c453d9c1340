//! Script segmentation.
//!
//! Every code point in the Arabic block goes to the Arabic bucket. Whitespace
//! whose nearest non-blank neighbours on both sides are Arabic stays with the
//! Arabic text so Arabic words remain separated. Everything else (Latin
//! letters, digits, punctuation, other whitespace) goes to the Latin bucket.
//! Order within a bucket is preserved.

use souq_core::types::Script;

pub fn is_arabic(c: char) -> bool {
    ('\u{0600}'..='\u{06FF}').contains(&c)
}

pub fn script_of(c: char) -> Script {
    if is_arabic(c) {
        Script::Arabic
    } else {
        Script::Latin
    }
}

/// The two script buckets of a query, untrimmed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentedQuery {
    pub latin: String,
    pub arabic: String,
    latin_start: Option<usize>,
    arabic_start: Option<usize>,
}

/// A non-empty, trimmed, single-script part of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub script: Script,
    pub text: String,
    /// Char offset in the query of the first code point of this bucket.
    pub position: usize,
}

impl Segment {
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

pub fn segment(query: &str) -> SegmentedQuery {
    let chars: Vec<char> = query.chars().collect();
    // whether the closest non-whitespace char after each position is Arabic
    let mut arabic_after = vec![false; chars.len()];
    let mut next = false;
    for (pos, &c) in chars.iter().enumerate().rev() {
        arabic_after[pos] = next;
        if !c.is_whitespace() {
            next = is_arabic(c);
        }
    }

    let mut out = SegmentedQuery::default();
    let mut arabic_before = false;
    for (pos, &c) in chars.iter().enumerate() {
        let script = if c.is_whitespace() && arabic_before && arabic_after[pos] {
            Script::Arabic
        } else {
            script_of(c)
        };
        if !c.is_whitespace() {
            arabic_before = is_arabic(c);
        }
        match script {
            Script::Arabic => {
                out.arabic_start.get_or_insert(pos);
                out.arabic.push(c);
            }
            Script::Latin => {
                out.latin_start.get_or_insert(pos);
                out.latin.push(c);
            }
        }
    }
    out
}

impl SegmentedQuery {
    pub fn part(&self, script: Script) -> &str {
        match script {
            Script::Latin => &self.latin,
            Script::Arabic => &self.arabic,
        }
    }

    /// Buckets that still hold text after trimming, in order of first appearance.
    pub fn segments(&self) -> Vec<Segment> {
        let buckets = [(Script::Latin, self.latin_start), (Script::Arabic, self.arabic_start)];
        let mut segments: Vec<Segment> = buckets
            .into_iter()
            .filter_map(|(script, start)| {
                let text = self.part(script).trim();
                match start {
                    Some(position) if !text.is_empty() => {
                        Some(Segment { script, text: text.to_string(), position })
                    }
                    _ => None,
                }
            })
            .collect();
        segments.sort_by_key(|s| s.position);
        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin_only_has_empty_arabic_bucket() {
        let s = segment("protein bar 2x");
        assert_eq!(s.latin, "protein bar 2x");
        assert!(s.arabic.is_empty());
        assert_eq!(s.segments().len(), 1);
    }

    #[test]
    fn mixed_query_splits_by_script() {
        let s = segment("protein بروتين");
        assert_eq!(s.latin, "protein ");
        assert_eq!(s.arabic, "بروتين");
        let segments = s.segments();
        assert_eq!(segments[0].script, Script::Latin);
        assert_eq!(segments[0].text, "protein");
        assert_eq!(segments[1].script, Script::Arabic);
        assert_eq!(segments[1].position, 8);
    }

    #[test]
    fn arabic_first_orders_segments_by_position() {
        let segments = segment("زبادي greek").segments();
        let scripts: Vec<Script> = segments.iter().map(|s| s.script).collect();
        assert_eq!(scripts, vec![Script::Arabic, Script::Latin]);
    }

    #[test]
    fn whitespace_bucket_is_not_a_segment() {
        let s = segment(" زبادي ");
        assert_eq!(s.latin, "  ");
        let segments = s.segments();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "زبادي");
    }

    #[test]
    fn space_between_arabic_words_stays_arabic() {
        let s = segment("بروتين برو");
        assert!(s.latin.is_empty());
        assert_eq!(s.arabic, "بروتين برو");
        assert_eq!(s.segments()[0].text.split_whitespace().count(), 2);
    }

    #[test]
    fn space_at_script_boundary_goes_latin() {
        let s = segment("whey بروتين  برو bar");
        assert_eq!(s.arabic, "بروتين  برو");
        assert_eq!(s.latin, "whey  bar");
    }

    #[test]
    fn resegmenting_parts_is_idempotent() {
        let queries =
            ["protein", "بروتين", "pro بروتين bar", "  ", "", "a١b", "زبادي يوناني x", " تم ، تم "];
        for q in queries {
            let first = segment(q);
            let again = segment(&format!("{}{}", first.latin, first.arabic));
            assert_eq!(again.latin, first.latin, "q={:?}", q);
            assert_eq!(again.arabic, first.arabic, "q={:?}", q);
        }
    }

    #[test]
    fn segment_length_counts_chars() {
        let segments = segment("تم").segments();
        assert_eq!(segments[0].char_len(), 2);
    }
}
