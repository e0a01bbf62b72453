//! User-chosen filter constraints and their compilation into a [`FilterExpr`].
//!
//! Categories are compiled in a fixed order so the same state always
//! produces the same predicate: volume, CPC, difficulty, rank, domain rank,
//! intent, dofollow, keyword patterns, URL patterns. Range bounds and
//! single-value categories are joined by `and` at the top level; each
//! pattern list becomes one left-nested sub-expression.

use seoquery_api::types::SearchIntent;
use seoquery_api::{Connective, Field, FilterClause, FilterExpr, FilterOperator, FilterValue};
use serde::{Deserialize, Serialize};

use crate::error::SeoQueryError;
use crate::schema::FilterFields;

/// Inclusive range with optional bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Range<T> {
    pub min: Option<T>,
    pub max: Option<T>,
}

impl<T: Copy + PartialOrd> Range<T> {
    pub fn new(min: Option<T>, max: Option<T>) -> Self {
        Self { min, max }
    }

    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// `true` when both bounds are set and `min > max`.
    pub fn is_inverted(&self) -> bool {
        matches!((self.min, self.max), (Some(lo), Some(hi)) if lo > hi)
    }
}

/// One free-text pattern. `connective` joins it to the patterns before it
/// and is ignored on the first pattern of a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternClause {
    #[serde(default)]
    pub connective: Connective,
    /// Match rows that do NOT contain the pattern.
    #[serde(default)]
    pub negate: bool,
    pub pattern: String,
}

impl PatternClause {
    pub fn contains(pattern: &str) -> Self {
        Self {
            connective: Connective::And,
            negate: false,
            pattern: pattern.to_string(),
        }
    }

    pub fn excludes(pattern: &str) -> Self {
        Self {
            negate: true,
            ..Self::contains(pattern)
        }
    }

    pub fn joined_by(mut self, connective: Connective) -> Self {
        self.connective = connective;
        self
    }
}

/// Filter constraints for one report page. Every field is optional; an
/// unset field means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default)]
    pub volume: Range<i64>,
    #[serde(default)]
    pub cpc: Range<f64>,
    #[serde(default)]
    pub difficulty: Range<i64>,
    #[serde(default)]
    pub rank: Range<i64>,
    #[serde(default)]
    pub domain_rank: Range<i64>,
    #[serde(default)]
    pub intent: Option<SearchIntent>,
    #[serde(default)]
    pub dofollow: Option<bool>,
    #[serde(default)]
    pub keyword_patterns: Vec<PatternClause>,
    #[serde(default)]
    pub url_patterns: Vec<PatternClause>,
}

impl FilterState {
    /// `true` when no constraint is set.
    pub fn is_empty(&self) -> bool {
        self.volume.is_empty()
            && self.cpc.is_empty()
            && self.difficulty.is_empty()
            && self.rank.is_empty()
            && self.domain_rank.is_empty()
            && self.intent.is_none()
            && self.dofollow.is_none()
            && self.keyword_patterns.is_empty()
            && self.url_patterns.is_empty()
    }

    /// Checks the state before it is applied: ranges must not be inverted or
    /// negative, CPC bounds must be finite, and patterns must not be blank.
    ///
    /// [`FilterState::compile`] does not call this; an inverted range
    /// compiles as given.
    pub fn validate(&self) -> Result<(), SeoQueryError> {
        check_int_range("volume", &self.volume)?;
        check_int_range("difficulty", &self.difficulty)?;
        check_int_range("rank", &self.rank)?;
        check_int_range("domain rank", &self.domain_rank)?;

        for bound in [self.cpc.min, self.cpc.max].into_iter().flatten() {
            if !bound.is_finite() || bound < 0.0 {
                return Err(SeoQueryError::InvalidInput(format!(
                    "cpc bound {} must be a non-negative number",
                    bound
                )));
            }
        }
        if self.cpc.is_inverted() {
            return Err(inverted("cpc"));
        }

        if let Some(max) = self.difficulty.max {
            if max > 100 {
                return Err(SeoQueryError::InvalidInput(
                    "difficulty is a 0-100 score".to_string(),
                ));
            }
        }

        for clause in self.keyword_patterns.iter().chain(self.url_patterns.iter()) {
            if clause.pattern.trim().is_empty() || clause.pattern.trim_matches('%').is_empty() {
                return Err(SeoQueryError::InvalidInput(
                    "filter patterns must not be blank".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Compiles the state into a predicate tree for a report's fields.
    ///
    /// Returns `Ok(None)` when no constraint is set. Fails when a populated
    /// category is not available on the report or a clause is ill-typed.
    pub fn compile(&self, fields: &FilterFields) -> Result<Option<FilterExpr>, SeoQueryError> {
        let mut children: Vec<FilterExpr> = Vec::new();

        push_range(&mut children, "volume", fields.volume, &self.volume)?;
        push_range(&mut children, "cpc", fields.cpc, &self.cpc)?;
        push_range(&mut children, "difficulty", fields.difficulty, &self.difficulty)?;
        push_range(&mut children, "rank", fields.rank, &self.rank)?;
        push_range(&mut children, "domain rank", fields.domain_rank, &self.domain_rank)?;

        if let Some(intent) = self.intent {
            let field = require(fields.intent, "intent")?;
            children.push(clause(field, FilterOperator::Eq, intent.as_str())?);
        }
        if let Some(dofollow) = self.dofollow {
            let field = require(fields.dofollow, "dofollow")?;
            children.push(clause(field, FilterOperator::Eq, dofollow)?);
        }
        if let Some(expr) = compile_patterns(fields.keyword, "keyword", &self.keyword_patterns)? {
            children.push(expr);
        }
        if let Some(expr) = compile_patterns(fields.url, "url", &self.url_patterns)? {
            children.push(expr);
        }

        Ok(FilterExpr::all(children).simplify())
    }

    /// Short human-readable summary of the active constraints, in
    /// compilation order.
    pub fn describe(&self) -> Vec<String> {
        let mut out = Vec::new();
        describe_range(&mut out, "volume", &self.volume);
        describe_range(&mut out, "cpc", &self.cpc);
        describe_range(&mut out, "difficulty", &self.difficulty);
        describe_range(&mut out, "rank", &self.rank);
        describe_range(&mut out, "domain rank", &self.domain_rank);
        if let Some(intent) = self.intent {
            out.push(format!("intent = {}", intent));
        }
        if let Some(dofollow) = self.dofollow {
            out.push(format!("dofollow = {}", dofollow));
        }
        describe_patterns(&mut out, "keyword", &self.keyword_patterns);
        describe_patterns(&mut out, "url", &self.url_patterns);
        out
    }
}

fn inverted(name: &str) -> SeoQueryError {
    SeoQueryError::InvalidInput(format!("{} minimum is greater than its maximum", name))
}

fn check_int_range(name: &str, range: &Range<i64>) -> Result<(), SeoQueryError> {
    for bound in [range.min, range.max].into_iter().flatten() {
        if bound < 0 {
            return Err(SeoQueryError::InvalidInput(format!(
                "{} bound {} must not be negative",
                name, bound
            )));
        }
    }
    if range.is_inverted() {
        return Err(inverted(name));
    }
    Ok(())
}

fn require(field: Option<Field>, name: &str) -> Result<Field, SeoQueryError> {
    field.ok_or_else(|| {
        SeoQueryError::InvalidInput(format!("the {} filter is not available for this report", name))
    })
}

fn clause(
    field: Field,
    operator: FilterOperator,
    value: impl Into<FilterValue>,
) -> Result<FilterExpr, SeoQueryError> {
    FilterClause::new(field, operator, value)
        .map(FilterExpr::from)
        .map_err(|e| SeoQueryError::InvalidInput(e.to_string()))
}

fn push_range<T>(
    children: &mut Vec<FilterExpr>,
    name: &str,
    field: Option<Field>,
    range: &Range<T>,
) -> Result<(), SeoQueryError>
where
    T: Copy + PartialOrd + Into<FilterValue>,
{
    if range.is_empty() {
        return Ok(());
    }
    let field = require(field, name)?;
    if let Some(min) = range.min {
        children.push(clause(field, FilterOperator::Gte, min)?);
    }
    if let Some(max) = range.max {
        children.push(clause(field, FilterOperator::Lte, max)?);
    }
    Ok(())
}

fn compile_patterns(
    field: Option<Field>,
    name: &str,
    patterns: &[PatternClause],
) -> Result<Option<FilterExpr>, SeoQueryError> {
    let Some((first, rest)) = patterns.split_first() else {
        return Ok(None);
    };
    let field = require(field, name)?;
    let to_expr = |p: &PatternClause| {
        let op = if p.negate {
            FilterOperator::NotLike
        } else {
            FilterOperator::Like
        };
        clause(field, op, p.pattern.as_str())
    };

    let first = to_expr(first)?;
    let rest = rest
        .iter()
        .map(|p| Ok((p.connective, to_expr(p)?)))
        .collect::<Result<Vec<_>, SeoQueryError>>()?;
    Ok(Some(FilterExpr::fold_left(first, rest)))
}

fn describe_range<T: Copy + PartialOrd + std::fmt::Display>(
    out: &mut Vec<String>,
    name: &str,
    range: &Range<T>,
) {
    match (range.min, range.max) {
        (Some(lo), Some(hi)) => out.push(format!("{} {}..{}", name, lo, hi)),
        (Some(lo), None) => out.push(format!("{} >= {}", name, lo)),
        (None, Some(hi)) => out.push(format!("{} <= {}", name, hi)),
        (None, None) => {}
    }
}

fn describe_patterns(out: &mut Vec<String>, name: &str, patterns: &[PatternClause]) {
    for (i, p) in patterns.iter().enumerate() {
        let op = if p.negate { "not like" } else { "like" };
        if i == 0 {
            out.push(format!("{} {} {}", name, op, p.pattern));
        } else {
            out.push(format!("{} {} {} {}", p.connective, name, op, p.pattern));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Report;

    fn compiled(state: &FilterState, report: Report) -> Option<String> {
        state
            .compile(&report.fields())
            .unwrap()
            .map(|expr| serde_json::to_string(&expr.compile().unwrap().unwrap()).unwrap())
    }

    #[test]
    fn empty_state_compiles_to_nothing() {
        let state = FilterState::default();
        assert!(state.is_empty());
        for report in Report::ALL {
            assert_eq!(compiled(&state, report), None);
        }
    }

    #[test]
    fn min_only_is_one_clause() {
        let state = FilterState {
            volume: Range::new(Some(100), None),
            ..Default::default()
        };
        assert_eq!(
            compiled(&state, Report::KeywordIdeas).unwrap(),
            r#"["keyword_info.search_volume",">=",100]"#
        );
    }

    #[test]
    fn max_only_is_one_clause() {
        let state = FilterState {
            volume: Range::new(None, Some(500)),
            ..Default::default()
        };
        assert_eq!(
            compiled(&state, Report::KeywordIdeas).unwrap(),
            r#"["keyword_info.search_volume","<=",500]"#
        );
    }

    #[test]
    fn both_bounds_joined_by_and() {
        let state = FilterState {
            volume: Range::new(Some(100), Some(500)),
            ..Default::default()
        };
        assert_eq!(
            compiled(&state, Report::KeywordIdeas).unwrap(),
            r#"[["keyword_info.search_volume",">=",100],"and",["keyword_info.search_volume","<=",500]]"#
        );
    }

    #[test]
    fn volume_range_and_intent() {
        let state = FilterState {
            volume: Range::new(Some(100), Some(500)),
            intent: Some(SearchIntent::Commercial),
            ..Default::default()
        };
        assert_eq!(
            compiled(&state, Report::RankedKeywords).unwrap(),
            concat!(
                r#"[["keyword_data.keyword_info.search_volume",">=",100],"and","#,
                r#"["keyword_data.keyword_info.search_volume","<=",500],"and","#,
                r#"["keyword_data.search_intent_info.main_intent","=","commercial"]]"#
            )
        );
    }

    #[test]
    fn patterns_nest_left_associatively() {
        let state = FilterState {
            url_patterns: vec![
                PatternClause::contains("%/blog/%"),
                PatternClause::contains("%/news/%").joined_by(Connective::Or),
                PatternClause::excludes("%/tag/%").joined_by(Connective::And),
            ],
            ..Default::default()
        };
        assert_eq!(
            compiled(&state, Report::RankedKeywords).unwrap(),
            concat!(
                r#"[[["ranked_serp_element.serp_item.relative_url","like","%/blog/%"],"or","#,
                r#"["ranked_serp_element.serp_item.relative_url","like","%/news/%"]],"and","#,
                r#"["ranked_serp_element.serp_item.relative_url","not_like","%/tag/%"]]"#
            )
        );
    }

    #[test]
    fn functional_filters_precede_patterns() {
        let state = FilterState {
            keyword_patterns: vec![PatternClause::contains("%shoe%")],
            dofollow: None,
            cpc: Range::new(Some(1.5), None),
            ..Default::default()
        };
        let out = compiled(&state, Report::KeywordIdeas).unwrap();
        assert!(out.starts_with(r#"[["keyword_info.cpc",">=",1.5],"and",["keyword","like""#));
    }

    #[test]
    fn compile_is_byte_identical_across_calls() {
        let state = FilterState {
            volume: Range::new(Some(10), Some(20)),
            rank: Range::new(None, Some(10)),
            intent: Some(SearchIntent::Informational),
            url_patterns: vec![
                PatternClause::contains("a"),
                PatternClause::contains("b").joined_by(Connective::Or),
            ],
            ..Default::default()
        };
        assert_eq!(
            compiled(&state, Report::KeywordGap),
            compiled(&state, Report::KeywordGap)
        );
    }

    #[test]
    fn inverted_range_passes_through_compile() {
        let state = FilterState {
            volume: Range::new(Some(500), Some(100)),
            ..Default::default()
        };
        assert!(state.compile(&Report::KeywordIdeas.fields()).unwrap().is_some());
        assert!(state.validate().is_err());
    }

    #[test]
    fn unsupported_category_is_rejected() {
        let state = FilterState {
            volume: Range::new(Some(1), None),
            ..Default::default()
        };
        let err = state.compile(&Report::Backlinks.fields()).unwrap_err();
        assert!(err.to_string().contains("volume"));

        let state = FilterState {
            dofollow: Some(true),
            ..Default::default()
        };
        assert!(state.compile(&Report::KeywordIdeas.fields()).is_err());
    }

    #[test]
    fn validate_rejects_bad_bounds() {
        let negative = FilterState {
            rank: Range::new(Some(-1), None),
            ..Default::default()
        };
        assert!(negative.validate().is_err());

        let bad_cpc = FilterState {
            cpc: Range::new(Some(f64::NAN), None),
            ..Default::default()
        };
        assert!(bad_cpc.validate().is_err());

        let difficulty = FilterState {
            difficulty: Range::new(None, Some(101)),
            ..Default::default()
        };
        assert!(difficulty.validate().is_err());

        let blank = FilterState {
            url_patterns: vec![PatternClause::contains("%%")],
            ..Default::default()
        };
        assert!(blank.validate().is_err());
    }

    #[test]
    fn describe_lists_constraints_in_order() {
        let state = FilterState {
            volume: Range::new(Some(100), Some(500)),
            intent: Some(SearchIntent::Commercial),
            url_patterns: vec![
                PatternClause::contains("%a%"),
                PatternClause::excludes("%b%").joined_by(Connective::Or),
            ],
            ..Default::default()
        };
        assert_eq!(
            state.describe(),
            vec![
                "volume 100..500",
                "intent = commercial",
                "url like %a%",
                "or url not like %b%",
            ]
        );
    }

    #[test]
    fn state_serde_round_trip_keeps_patterns() {
        let state = FilterState {
            dofollow: Some(false),
            keyword_patterns: vec![PatternClause::excludes("%free%").joined_by(Connective::Or)],
            ..Default::default()
        };
        let json = serde_json::to_string(&state).unwrap();
        let back: FilterState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
