//! Locator Set: resolves logical fields through ordered fallback rules.
//!
//! A miss is never an error here. Callers substitute their own defaults,
//! so a page whose markup drifted degrades to default values instead of
//! failing the run.

use std::collections::BTreeMap;

use regex::Regex;
use ytharvest_core::{Field, LocatorRule, LocatorTable};

use crate::error::{EngineError, PageError};
use crate::page::Page;

/// An element together with the value derived from it.
#[derive(Debug)]
pub struct Resolved<N> {
    pub node: N,
    pub value: String,
}

#[derive(Debug)]
struct CompiledRule {
    selector: String,
    attribute: Option<String>,
    pattern: Option<Regex>,
    reject: Vec<String>,
}

impl CompiledRule {
    fn compile(field: Field, rule: &LocatorRule) -> Result<Self, EngineError> {
        let pattern = rule
            .pattern
            .as_deref()
            .map(|p| {
                Regex::new(p).map_err(|source| EngineError::InvalidPattern {
                    field,
                    pattern: p.to_string(),
                    source,
                })
            })
            .transpose()?;
        Ok(Self {
            selector: rule.selector.clone(),
            attribute: rule.attribute.clone(),
            pattern,
            reject: rule.reject.clone(),
        })
    }

    /// Turn a raw text or attribute value into the rule's derived value.
    fn refine(&self, raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        let value = match &self.pattern {
            Some(re) => {
                let caps = re.captures(trimmed)?;
                caps.get(1).or_else(|| caps.get(0))?.as_str().trim()
            }
            None => trimmed,
        };
        if value.is_empty() || self.reject.iter().any(|r| r == value) {
            return None;
        }
        Some(value.to_string())
    }

    async fn value_of<P: Page>(&self, page: &P, node: &P::Node) -> Option<String> {
        let raw = match &self.attribute {
            Some(name) => page.attribute(node, name).await,
            None => page.text(node).await,
        };
        match raw {
            Ok(Some(raw)) => self.refine(&raw),
            Ok(None) => None,
            Err(err) => {
                tracing::debug!(selector = %self.selector, error = %err, "value read failed");
                None
            }
        }
    }
}

#[derive(Debug)]
pub struct LocatorSet {
    rules: BTreeMap<Field, Vec<CompiledRule>>,
}

impl LocatorSet {
    /// Compile a rule table.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidPattern`] if any rule's pattern is not a
    /// valid regular expression.
    pub fn new(table: &LocatorTable) -> Result<Self, EngineError> {
        let mut rules = BTreeMap::new();
        for field in Field::ALL {
            let field_rules = table.rules(field);
            if field_rules.is_empty() {
                continue;
            }
            let compiled = field_rules
                .iter()
                .map(|rule| CompiledRule::compile(field, rule))
                .collect::<Result<Vec<_>, _>>()?;
            rules.insert(field, compiled);
        }
        Ok(Self { rules })
    }

    fn rules(&self, field: Field) -> &[CompiledRule] {
        self.rules.get(&field).map_or(&[], Vec::as_slice)
    }

    /// First element, under the first rule that matches anything, whose
    /// derived value is non-empty.
    ///
    /// Like `querySelector`, only the first match of each rule is
    /// considered.
    pub async fn resolve<P: Page>(
        &self,
        page: &P,
        field: Field,
        scope: Option<&P::Node>,
    ) -> Option<Resolved<P::Node>> {
        for rule in self.rules(field) {
            let Some(node) = first_match(page, field, rule, scope).await else {
                continue;
            };
            if let Some(value) = rule.value_of(page, &node).await {
                return Some(Resolved { node, value });
            }
        }
        tracing::trace!(%field, "locator miss");
        None
    }

    /// Derived value of [`resolve`](Self::resolve), if any.
    pub async fn value<P: Page>(
        &self,
        page: &P,
        field: Field,
        scope: Option<&P::Node>,
    ) -> Option<String> {
        self.resolve(page, field, scope).await.map(|r| r.value)
    }

    /// First matching element with no requirement on its value. Used for
    /// controls such as an empty editor.
    pub async fn element<P: Page>(
        &self,
        page: &P,
        field: Field,
        scope: Option<&P::Node>,
    ) -> Option<P::Node> {
        for rule in self.rules(field) {
            if let Some(node) = first_match(page, field, rule, scope).await {
                return Some(node);
            }
        }
        None
    }

    /// Every match of the first rule that matches anything.
    ///
    /// # Errors
    ///
    /// Returns the last [`PageError`] only when every rule failed with one;
    /// rules that simply match nothing yield `Ok(vec![])`.
    pub async fn nodes<P: Page>(
        &self,
        page: &P,
        field: Field,
        scope: Option<&P::Node>,
    ) -> Result<Vec<P::Node>, PageError> {
        let mut last_err = None;
        let mut any_ok = false;
        for rule in self.rules(field) {
            match page.query_all(scope, &rule.selector).await {
                Ok(nodes) if !nodes.is_empty() => return Ok(nodes),
                Ok(_) => any_ok = true,
                Err(err) => {
                    tracing::debug!(
                        %field,
                        selector = %rule.selector,
                        error = %err,
                        "locator query failed"
                    );
                    last_err = Some(err);
                }
            }
        }
        match last_err {
            Some(err) if !any_ok => Err(err),
            _ => Ok(Vec::new()),
        }
    }

    /// Every non-empty value of the first rule that yields any.
    pub async fn values<P: Page>(
        &self,
        page: &P,
        field: Field,
        scope: Option<&P::Node>,
    ) -> Vec<String> {
        for rule in self.rules(field) {
            let nodes = match page.query_all(scope, &rule.selector).await {
                Ok(nodes) => nodes,
                Err(err) => {
                    tracing::debug!(
                        %field,
                        selector = %rule.selector,
                        error = %err,
                        "locator query failed"
                    );
                    continue;
                }
            };
            let mut values = Vec::new();
            for node in &nodes {
                if let Some(value) = rule.value_of(page, node).await {
                    values.push(value);
                }
            }
            if !values.is_empty() {
                return values;
            }
        }
        Vec::new()
    }
}

async fn first_match<P: Page>(
    page: &P,
    field: Field,
    rule: &CompiledRule,
    scope: Option<&P::Node>,
) -> Option<P::Node> {
    match page.query_all(scope, &rule.selector).await {
        Ok(nodes) => nodes.into_iter().next(),
        Err(err) => {
            tracing::debug!(
                %field,
                selector = %rule.selector,
                error = %err,
                "locator query failed"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_locators, FakePage, FakeThread};

    fn table_with(field: Field, rules: Vec<LocatorRule>) -> LocatorSet {
        let mut table = LocatorTable {
            locators: BTreeMap::new(),
        };
        table.locators.insert(field, rules);
        LocatorSet::new(&table).unwrap()
    }

    #[test]
    fn refine_applies_pattern_capture() {
        let rule = CompiledRule::compile(
            Field::VideoLikes,
            &LocatorRule::attr("b", "aria-label").with_pattern(r"along with ([\d,]+)"),
        )
        .unwrap();
        assert_eq!(
            rule.refine("like this video along with 1,234 other people").as_deref(),
            Some("1,234")
        );
        assert!(rule.refine("Like").is_none());
    }

    #[test]
    fn refine_uses_whole_match_without_groups() {
        let rule =
            CompiledRule::compile(Field::ViewCount, &LocatorRule::text("v").with_pattern(r"\d+"))
                .unwrap();
        assert_eq!(rule.refine("views: 42 total").as_deref(), Some("42"));
    }

    #[test]
    fn refine_honours_reject_list_and_blank_values() {
        let rule =
            CompiledRule::compile(Field::VideoLikes, &LocatorRule::text("t").rejecting("Like"))
                .unwrap();
        assert!(rule.refine("  Like ").is_none());
        assert!(rule.refine("   ").is_none());
        assert_eq!(rule.refine(" 12K ").as_deref(), Some("12K"));
    }

    #[test]
    fn invalid_pattern_is_rejected_at_compile_time() {
        let mut table = LocatorTable {
            locators: BTreeMap::new(),
        };
        table.locators.insert(
            Field::VideoLikes,
            vec![LocatorRule::text("x").with_pattern("(unclosed")],
        );
        let err = LocatorSet::new(&table).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidPattern {
                field: Field::VideoLikes,
                ..
            }
        ));
    }

    #[test]
    fn builtin_table_compiles() {
        LocatorSet::new(&LocatorTable::default()).unwrap();
    }

    #[tokio::test]
    async fn resolve_falls_back_to_later_rules() {
        let page = FakePage::new(vec![]).with_doc_text("title", "Real Title");
        let locators = table_with(
            Field::VideoTitle,
            vec![
                LocatorRule::text("missing"),
                LocatorRule::text("!error"),
                LocatorRule::text("title"),
            ],
        );
        let value = locators.value(&page, Field::VideoTitle, None).await;
        assert_eq!(value.as_deref(), Some("Real Title"));
    }

    #[tokio::test]
    async fn resolve_skips_rules_with_blank_values() {
        let page = FakePage::new(vec![])
            .with_doc_text("blank", "   ")
            .with_doc_text("title", "Second");
        let locators = table_with(
            Field::VideoTitle,
            vec![LocatorRule::text("blank"), LocatorRule::text("title")],
        );
        assert_eq!(
            locators.value(&page, Field::VideoTitle, None).await.as_deref(),
            Some("Second")
        );
    }

    #[tokio::test]
    async fn resolve_miss_is_none() {
        let page = FakePage::new(vec![]);
        let locators = test_locators();
        assert!(locators.resolve(&page, Field::VideoTitle, None).await.is_none());
    }

    #[tokio::test]
    async fn resolve_reads_attributes() {
        let page = FakePage::new(vec![]).with_doc_attr("avatar", "src", "https://yt3/a=s48-c-k");
        let locators = test_locators();
        assert_eq!(
            locators
                .value(&page, Field::ChannelAvatar, None)
                .await
                .as_deref(),
            Some("https://yt3/a=s48-c-k")
        );
    }

    #[tokio::test]
    async fn element_ignores_empty_values() {
        let mut thread = FakeThread::new("hello", "@a");
        thread.reply_button = true;
        thread.input = true;
        let page = FakePage::new(vec![thread]);
        let locators = test_locators();
        let threads = locators.nodes(&page, Field::Thread, None).await.unwrap();
        let button = locators
            .element(&page, Field::ReplyButton, Some(&threads[0]))
            .await
            .unwrap();
        page.click(&button).await.unwrap();
        // editor is empty, so resolve() misses while element() finds it
        assert!(locators
            .resolve(&page, Field::ReplyInput, Some(&threads[0]))
            .await
            .is_none());
        assert!(locators
            .element(&page, Field::ReplyInput, Some(&threads[0]))
            .await
            .is_some());
    }

    #[tokio::test]
    async fn nodes_errors_only_when_every_rule_errors() {
        let page = FakePage::new(vec![FakeThread::new("a", "@a")]);
        let all_broken = table_with(
            Field::Thread,
            vec![LocatorRule::text("!error"), LocatorRule::text("!error")],
        );
        assert!(all_broken.nodes(&page, Field::Thread, None).await.is_err());

        let partly_broken = table_with(
            Field::Thread,
            vec![LocatorRule::text("!error"), LocatorRule::text("nothing")],
        );
        assert!(partly_broken
            .nodes(&page, Field::Thread, None)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn values_collects_all_matches_of_first_productive_rule() {
        let mut thread = FakeThread::new("hello", "@a");
        thread.reply_authors = vec!["@x".into(), "@y".into()];
        let page = FakePage::new(vec![thread]);
        let locators = test_locators();
        let threads = locators.nodes(&page, Field::Thread, None).await.unwrap();
        let authors = locators
            .values(&page, Field::ReplyAuthor, Some(&threads[0]))
            .await;
        assert_eq!(authors, vec!["@x".to_string(), "@y".to_string()]);
    }
}
