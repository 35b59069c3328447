//! Discussion items located in a rendered page with CSS selector profiles.
use anyhow::{Result, anyhow};
use scout_config::SelectorProfile;
use scout_discussions::{ElementView, ItemHandle, ListingSource};
use scraper::{ElementRef, Html, Selector};
use std::fmt::Write as _;
use url::Url;

const PROBE_SAMPLE_LIMIT: usize = 5;
const PROBE_TEXT_LIMIT: usize = 100;

fn compile(css: &str, what: &str, profile: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| anyhow!("selectors.{profile}.{what}: invalid CSS `{css}`: {e}"))
}

fn compile_opt(css: Option<&str>, what: &str, profile: &str) -> Result<Option<Selector>> {
    css.map(|css| compile(css, what, profile)).transpose()
}

pub(crate) struct CompiledProfile {
    name: String,
    item: Selector,
    title: Selector,
    author: Option<Selector>,
    timestamp: Option<Selector>,
    comments: Option<Selector>,
}

impl CompiledProfile {
    fn new(profile: &SelectorProfile) -> Result<Self> {
        let name = profile.name.as_str();
        Ok(Self {
            name: profile.name.clone(),
            item: compile(&profile.item, "item", name)?,
            title: compile(&profile.title, "title", name)?,
            author: compile_opt(profile.author.as_deref(), "author", name)?,
            timestamp: compile_opt(profile.timestamp.as_deref(), "timestamp", name)?,
            comments: compile_opt(profile.comments.as_deref(), "comments", name)?,
        })
    }
}

/// Parsed listing page. Holds a `scraper::Html`, which is not `Send`; build
/// it after the last `.await` of a render.
pub struct ListingDocument {
    html: Html,
    base: Url,
    profiles: Vec<CompiledProfile>,
}

impl ListingDocument {
    /// Parse `html` served from `base`. Fails only on an invalid selector.
    pub fn parse(html: &str, base: Url, profiles: &[SelectorProfile]) -> Result<Self> {
        let profiles = profiles
            .iter()
            .map(CompiledProfile::new)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            html: Html::parse_document(html),
            base,
            profiles,
        })
    }

    fn active_profile(&self) -> Option<&CompiledProfile> {
        self.profiles
            .iter()
            .find(|p| self.html.select(&p.item).next().is_some())
    }

    /// Name of the first profile whose item selector matches.
    pub fn profile_name(&self) -> Option<&str> {
        self.active_profile().map(|p| p.name.as_str())
    }

    fn count(&self, css: &str) -> usize {
        Selector::parse(css)
            .map(|sel| self.html.select(&sel).count())
            .unwrap_or(0)
    }

    /// Count broader patterns than any profile uses. Meant for pages where
    /// no profile matched.
    pub fn probe(&self) -> ProbeReport {
        let discussion_links = Selector::parse(r#"a[href*="/discussions/"]"#)
            .map(|sel| {
                self.html
                    .select(&sel)
                    .take(PROBE_SAMPLE_LIMIT)
                    .map(|el| {
                        let el = HtmlElement { el, base: &self.base };
                        LinkSample {
                            href: el.href().unwrap_or_default(),
                            text: el.text().trim().chars().take(PROBE_TEXT_LIMIT).collect(),
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        ProbeReport {
            box_rows: self.count("li.Box-row"),
            title_links: self.count("a.markdown-title"),
            list_items: self.count("li"),
            discussion_links,
        }
    }
}

impl ListingSource for ListingDocument {
    type Item<'a> = HtmlItem<'a>;

    fn list_items(&self) -> Vec<HtmlItem<'_>> {
        let Some(profile) = self.active_profile() else {
            tracing::debug!(target: "scout.listing", profiles = self.profiles.len(), "no selector profile matched");
            return Vec::new();
        };
        let items: Vec<HtmlItem<'_>> = self
            .html
            .select(&profile.item)
            .map(|element| HtmlItem {
                element,
                profile,
                base: &self.base,
            })
            .collect();
        tracing::debug!(target: "scout.listing", profile = %profile.name, items = items.len(), "located items");
        items
    }
}

/// One discussion item inside a [`ListingDocument`].
pub struct HtmlItem<'a> {
    element: ElementRef<'a>,
    profile: &'a CompiledProfile,
    base: &'a Url,
}

impl<'a> HtmlItem<'a> {
    fn find(&self, selector: Option<&'a Selector>) -> Option<HtmlElement<'a>> {
        self.element
            .select(selector?)
            .next()
            .map(|el| HtmlElement { el, base: self.base })
    }
}

impl<'a> ItemHandle for HtmlItem<'a> {
    type Element = HtmlElement<'a>;

    fn title_link(&self) -> Option<HtmlElement<'a>> {
        self.find(Some(&self.profile.title))
    }

    fn author_link(&self) -> Option<HtmlElement<'a>> {
        self.find(self.profile.author.as_ref())
    }

    fn timestamp(&self) -> Option<HtmlElement<'a>> {
        self.find(self.profile.timestamp.as_ref())
    }

    fn comment_link(&self) -> Option<HtmlElement<'a>> {
        self.find(self.profile.comments.as_ref())
    }
}

pub struct HtmlElement<'a> {
    el: ElementRef<'a>,
    base: &'a Url,
}

impl ElementView for HtmlElement<'_> {
    fn text(&self) -> String {
        self.el.text().collect()
    }

    fn attr(&self, name: &str) -> Option<String> {
        self.el.value().attr(name).map(str::to_string)
    }

    fn href(&self) -> Option<String> {
        let raw = self.el.value().attr("href")?;
        self.base.join(raw.trim()).ok().map(String::from)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSample {
    pub href: String,
    pub text: String,
}

/// Counts gathered by [`ListingDocument::probe`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeReport {
    pub box_rows: usize,
    pub title_links: usize,
    pub list_items: usize,
    pub discussion_links: Vec<LinkSample>,
}

pub fn render_probe(report: &ProbeReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Found {} li.Box-row elements", report.box_rows);
    let _ = writeln!(out, "Found {} markdown-title links", report.title_links);
    let _ = writeln!(out, "Found {} li elements total", report.list_items);
    if report.discussion_links.is_empty() {
        let _ = writeln!(out, "No discussion links found.");
    } else {
        let _ = writeln!(out, "Any discussion links found:");
        for link in &report.discussion_links {
            let _ = writeln!(out, "  - {} ({})", link.text, link.href);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_config::default_selector_profiles;
    use scout_discussions::extract_from;

    const BASE: &str = "https://github.com/orgs/community/discussions/categories/models";

    fn doc(html: &str) -> ListingDocument {
        ListingDocument::parse(html, Url::parse(BASE).unwrap(), &default_selector_profiles())
            .unwrap()
    }

    const BOX_ROWS: &str = r#"
<ul>
  <li class="Box-row js-navigation-item">
    <a class="markdown-title discussion-Link--secondary" href="/orgs/community/discussions/42">
      Rate limit error on gpt-4o
    </a>
    <a class="Link--muted Link--inTextBlock" href="/octocat" aria-label="View octocat's author profile">octocat</a>
    <relative-time datetime="2024-06-01T10:00:00Z">2 days ago</relative-time>
    <a href="/orgs/community/discussions/42#comments" aria-label="7 comments"> 7 </a>
  </li>
  <li class="Box-row js-navigation-item">
    <span>no title link here</span>
  </li>
  <li class="Box-row js-navigation-item">
    <a class="markdown-title discussion-Link--secondary" href="https://github.com/orgs/community/discussions/43">Bare item</a>
  </li>
</ul>"#;

    #[test]
    fn box_row_layout() {
        let doc = doc(BOX_ROWS);
        assert_eq!(doc.profile_name(), Some("box-row"));

        let records = extract_from(&doc);
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.title, "Rate limit error on gpt-4o");
        assert_eq!(first.url, "https://github.com/orgs/community/discussions/42");
        assert_eq!(first.author, "octocat");
        assert_eq!(first.datetime.as_deref(), Some("2024-06-01T10:00:00Z"));
        assert_eq!(first.time_text.as_deref(), Some("2 days ago"));
        assert_eq!(first.comment_count, "7");

        let bare = &records[1];
        assert_eq!(bare.author, "Unknown");
        assert_eq!(bare.datetime, None);
        assert_eq!(bare.comment_count, "0");
    }

    #[test]
    fn falls_back_to_testid_layout() {
        let html = r#"
<div data-testid="discussion-item">
  <a href="/orgs/community/discussions/9">How do I pick a model?</a>
  <a data-hovercard-type="user" href="/hubot">hubot</a>
  <relative-time datetime="2024-05-30">last week</relative-time>
</div>"#;
        let doc = doc(html);
        assert_eq!(doc.profile_name(), Some("testid"));
        let records = extract_from(&doc);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].author, "hubot");
        assert_eq!(records[0].url, "https://github.com/orgs/community/discussions/9");
    }

    #[test]
    fn unmatched_page_yields_nothing_and_probe_reports() {
        let html = r#"
<ul>
  <li class="Box-row">stale markup</li>
  <li><a class="markdown-title" href="/orgs/community/discussions/1">  One  </a></li>
  <li><a href="/orgs/community/discussions/2">Two</a></li>
</ul>"#;
        let doc = doc(html);
        assert_eq!(doc.profile_name(), None);
        assert!(extract_from(&doc).is_empty());

        let probe = doc.probe();
        assert_eq!(probe.box_rows, 1);
        assert_eq!(probe.title_links, 1);
        assert_eq!(probe.list_items, 3);
        assert_eq!(
            probe.discussion_links[0],
            LinkSample {
                href: "https://github.com/orgs/community/discussions/1".into(),
                text: "One".into(),
            }
        );

        let text = render_probe(&probe);
        assert!(text.contains("Found 1 li.Box-row elements"));
        assert!(text.contains("Found 3 li elements total"));
        assert!(text.contains("  - Two (https://github.com/orgs/community/discussions/2)"));
    }

    #[test]
    fn probe_samples_are_bounded() {
        let long = "x".repeat(300);
        let links: String = (0..8)
            .map(|i| format!(r#"<a href="/discussions/{i}">{long}</a>"#))
            .collect();
        let probe = doc(&links).probe();
        assert_eq!(probe.discussion_links.len(), 5);
        assert!(probe.discussion_links.iter().all(|l| l.text.chars().count() == 100));
    }

    #[test]
    fn invalid_selector_is_rejected() {
        let bad = SelectorProfile {
            name: "broken".into(),
            item: "li[".into(),
            title: "a".into(),
            author: None,
            timestamp: None,
            comments: None,
        };
        let err = ListingDocument::parse("<ul></ul>", Url::parse(BASE).unwrap(), &[bad])
            .err()
            .unwrap();
        assert!(err.to_string().contains("selectors.broken.item"));
    }

    #[test]
    fn missing_optional_selectors_never_match() {
        let profile = SelectorProfile {
            name: "titles-only".into(),
            item: "article".into(),
            title: "h2 a".into(),
            author: None,
            timestamp: None,
            comments: None,
        };
        let html = r#"<article><h2><a href="d/1">Hi</a></h2><relative-time datetime="2024-01-01">x</relative-time></article>"#;
        let doc = ListingDocument::parse(html, Url::parse(BASE).unwrap(), &[profile]).unwrap();
        let records = extract_from(&doc);
        assert_eq!(records[0].time_text, None);
        assert_eq!(
            records[0].url,
            "https://github.com/orgs/community/discussions/categories/d/1"
        );
    }
}
