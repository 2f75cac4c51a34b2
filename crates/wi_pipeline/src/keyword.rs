use wi_core::{Article, FilterOutcome};

/// Case-insensitive substring match of configured keywords against an
/// article's title and description.
#[derive(Debug, Clone)]
pub struct KeywordFilter {
    /// (as configured, lower-cased)
    keywords: Vec<(String, String)>,
}

impl KeywordFilter {
    /// Blank keywords are ignored; repeats collapse to their first occurrence.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut kept: Vec<(String, String)> = Vec::new();
        for keyword in keywords {
            let keyword = keyword.as_ref().trim();
            if keyword.is_empty() {
                continue;
            }
            let lowered = keyword.to_lowercase();
            if kept.iter().any(|(_, l)| *l == lowered) {
                continue;
            }
            kept.push((keyword.to_string(), lowered));
        }
        Self { keywords: kept }
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// `Some` with the matched keywords, in configuration order, when at least
    /// one keyword occurs. Articles with neither title nor description are
    /// rejected.
    pub fn apply(&self, article: &Article) -> Option<FilterOutcome> {
        if article.title.trim().is_empty() && article.description.trim().is_empty() {
            return None;
        }
        let text = article.headline_text().to_lowercase();
        let matched: Vec<String> = self
            .keywords
            .iter()
            .filter(|(_, lowered)| text.contains(lowered.as_str()))
            .map(|(keyword, _)| keyword.clone())
            .collect();

        if matched.is_empty() {
            None
        } else {
            Some(FilterOutcome {
                article: article.clone(),
                matched_keywords: matched,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, description: &str) -> Article {
        Article {
            id: "https://news.example.com/1".to_string(),
            company: "크래프톤".to_string(),
            title: title.to_string(),
            description: description.to_string(),
            link: "https://news.example.com/1".to_string(),
            published_at: None,
            body_text: None,
        }
    }

    #[test]
    fn test_matches_in_configuration_order() {
        let filter = KeywordFilter::new(["출시", "신작", "영업이익"]);
        let outcome = filter
            .apply(&article("크래프톤 신작 출시", "3분기 영업이익 발표"))
            .unwrap();
        assert_eq!(outcome.matched_keywords, vec!["출시", "신작", "영업이익"]);
    }

    #[test]
    fn test_case_insensitive() {
        let filter = KeywordFilter::new(["ai", "NFT"]);
        let outcome = filter.apply(&article("크래프톤, AI 스튜디오 설립", "nft 사업 재검토")).unwrap();
        assert_eq!(outcome.matched_keywords, vec!["ai", "NFT"]);
    }

    #[test]
    fn test_rejects_without_match() {
        let filter = KeywordFilter::new(["상장폐지"]);
        assert!(filter.apply(&article("크래프톤 채용 설명회", "대학생 대상")).is_none());
    }

    #[test]
    fn test_rejects_empty_article() {
        let filter = KeywordFilter::new(["%"]);
        assert!(filter.apply(&article("  ", "")).is_none());
    }

    #[test]
    fn test_blank_and_repeated_keywords_collapse() {
        let filter = KeywordFilter::new(["", "신작", "  ", "신작", "CBT", "cbt"]);
        assert_eq!(filter.len(), 2);
        let outcome = filter.apply(&article("신작 CBT 모집", "")).unwrap();
        assert_eq!(outcome.matched_keywords, vec!["신작", "CBT"]);
    }

    #[test]
    fn test_is_deterministic() {
        let filter = KeywordFilter::new(wi_core::defaults::default_keywords());
        let a = article("넷마블, 신작 사전예약 200만 돌파", "글로벌 출시 예정");
        let first = filter.apply(&a);
        for _ in 0..5 {
            assert_eq!(filter.apply(&a), first);
        }
        assert!(first.is_some());
    }
}
