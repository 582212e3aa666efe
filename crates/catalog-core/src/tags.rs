use std::collections::BTreeSet;

/// Normalize a record's label/collection list into a tag set.
///
/// Tags are trimmed and lowercased; blanks are dropped. A record without
/// any label field yields the empty set.
pub fn extract_tags<S: AsRef<str>>(labels: Option<&[S]>) -> BTreeSet<String> {
    labels
        .into_iter()
        .flatten()
        .map(|label| label.as_ref().trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Tags for an episode: its own, or the show's when it has none.
pub fn episode_tags<S: AsRef<str>>(
    episode_labels: Option<&[S]>,
    show_tags: &BTreeSet<String>,
) -> BTreeSet<String> {
    let own = extract_tags(episode_labels);
    if own.is_empty() {
        show_tags.clone()
    } else {
        own
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(tags: &[&str]) -> BTreeSet<String> {
        tags.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_extract_tags_normalizes() {
        let labels = vec![" DVD ".to_string(), "Ripped".to_string(), "dvd".to_string(), "  ".to_string()];
        assert_eq!(extract_tags(Some(labels.as_slice())), set(&["dvd", "ripped"]));
    }

    #[test]
    fn test_extract_tags_missing_field() {
        assert!(extract_tags::<String>(None).is_empty());
        assert!(extract_tags::<&str>(Some(&[])).is_empty());
    }

    #[test]
    fn test_episode_inherits_show_tags() {
        let show = set(&["blue-ray"]);
        assert_eq!(episode_tags::<String>(None, &show), show);
        assert_eq!(episode_tags(Some(&["ISO"][..]), &show), set(&["iso"]));
        // blank labels count as none
        assert_eq!(episode_tags(Some(&[" "][..]), &show), show);
    }
}
