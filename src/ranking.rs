//! Preference accumulation and bilinear article ranking.

use crate::models::{Article, Preference};

/// Adds one unit of interest in `(field, value)`.
///
/// Increments a matching entry in place, otherwise appends a new entry with score 1.
pub fn accumulate(preferences: &mut Vec<Preference>, field: &str, value: &str) {
    match preferences.iter_mut().find(|p| p.matches(field, value)) {
        Some(existing) => existing.score += 1,
        None => preferences.push(Preference::new(field, value, 1)),
    }
}

/// Sum of `a.score * u.score` over every pair of tags with equal field and value.
///
/// Both sides are treated as multisets, so duplicate tags contribute once per pair.
pub fn rank(article_tags: &[Preference], user_preferences: &[Preference]) -> i64 {
    user_preferences
        .iter()
        .flat_map(|u| {
            article_tags
                .iter()
                .filter(move |a| a.matches(&u.field, &u.value))
                .map(move |a| a.score * u.score)
        })
        .sum()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedArticle {
    pub score: i64,
    pub article: Article,
}

pub fn rank_articles(articles: &[Article], preferences: &[Preference]) -> Vec<RankedArticle> {
    let mut ranked: Vec<RankedArticle> = articles
        .iter()
        .map(|article| RankedArticle {
            score: rank(&article.tags(), preferences),
            article: article.clone(),
        })
        .collect();
    // sort_by is stable
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FEED_URL_FIELD;

    #[test]
    fn test_accumulate_appends_then_increments() {
        let mut prefs = Vec::new();
        accumulate(&mut prefs, FEED_URL_FIELD, "f1");
        accumulate(&mut prefs, FEED_URL_FIELD, "f1");

        assert_eq!(prefs, vec![Preference::new(FEED_URL_FIELD, "f1", 2)]);
    }

    #[test]
    fn test_accumulate_preserves_order() {
        let mut prefs = vec![
            Preference::new(FEED_URL_FIELD, "f1", 4),
            Preference::new(FEED_URL_FIELD, "f2", 1),
        ];
        accumulate(&mut prefs, "author", "ada");
        accumulate(&mut prefs, FEED_URL_FIELD, "f2");

        assert_eq!(
            prefs,
            vec![
                Preference::new(FEED_URL_FIELD, "f1", 4),
                Preference::new(FEED_URL_FIELD, "f2", 2),
                Preference::new("author", "ada", 1),
            ]
        );
    }

    #[test]
    fn test_accumulate_distinguishes_fields() {
        let mut prefs = Vec::new();
        accumulate(&mut prefs, FEED_URL_FIELD, "x");
        accumulate(&mut prefs, "author", "x");
        assert_eq!(prefs.len(), 2);
        assert!(prefs.iter().all(|p| p.score == 1));
    }

    #[test]
    fn test_rank_only_matching_pairs_contribute() {
        let article = vec![Preference::new(FEED_URL_FIELD, "f1", 3)];
        let user = vec![
            Preference::new(FEED_URL_FIELD, "f1", 2),
            Preference::new(FEED_URL_FIELD, "f2", 5),
        ];
        assert_eq!(rank(&article, &user), 6);
    }

    #[test]
    fn test_rank_disjoint_is_zero() {
        let article = vec![Preference::new(FEED_URL_FIELD, "f1", 3)];
        let user = vec![Preference::new("author", "f1", 9)];
        assert_eq!(rank(&article, &user), 0);
        assert_eq!(rank(&[], &user), 0);
    }

    #[test]
    fn test_rank_duplicates_multiply() {
        let article = vec![
            Preference::new(FEED_URL_FIELD, "f1", 1),
            Preference::new(FEED_URL_FIELD, "f1", 2),
        ];
        let user = vec![
            Preference::new(FEED_URL_FIELD, "f1", 10),
            Preference::new(FEED_URL_FIELD, "f1", 1),
        ];
        // (1 + 2) * (10 + 1)
        assert_eq!(rank(&article, &user), 33);
    }

    #[test]
    fn test_rank_articles_orders_by_score_and_keeps_ties_stable() {
        let articles = vec![
            Article::new("f2", "a", "https://x/a"),
            Article::new("f1", "b", "https://x/b"),
            Article::new("f2", "c", "https://x/c"),
            Article::new("f3", "d", "https://x/d"),
        ];
        let prefs = vec![
            Preference::new(FEED_URL_FIELD, "f1", 5),
            Preference::new(FEED_URL_FIELD, "f2", 2),
        ];

        let ranked = rank_articles(&articles, &prefs);
        let titles: Vec<&str> = ranked.iter().map(|r| r.article.title.as_str()).collect();
        assert_eq!(titles, vec!["b", "a", "c", "d"]);
        assert_eq!(ranked[0].score, 5);
        assert_eq!(ranked[3].score, 0);
    }
}
