//! End-to-end tests for the `Audit` facade.

use std::fs;

use chaff_audit::{
    Audit, AuditConfig, AuditEvent, ConfigError, PageSource, Palette, SelectorState,
};
use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;

const STYLE: &str = "#foo { color: red } #foo .bar { color: green } #foo .bar .baz { color: blue }";
const INDEX: &str = "<html><body><div id=foo><p class=bar>hi</p></div></body></html>";

fn audit() -> Audit {
    Audit::new(AuditConfig::default()).unwrap()
}

fn audit_with(css: &str) -> Audit {
    let mut audit = audit();
    let _ = audit.ingest(css);
    audit
}

#[test]
fn test_reports_unused_selectors() {
    let mut audit = audit_with(STYLE);
    let _ = audit.process(INDEX);
    assert_eq!(audit.selectors_to_review(), vec!["#foo .bar .baz"]);
    assert_eq!(audit.unused_selectors(), vec!["#foo .bar .baz"]);
    assert!(audit.unsupported_selectors().is_empty());
    assert_eq!(audit.total_selectors(), 3);
}

#[test]
fn test_nothing_used_without_documents() {
    let audit = audit_with(STYLE);
    assert_eq!(
        audit.selectors_to_review(),
        vec!["#foo", "#foo .bar", "#foo .bar .baz"]
    );
}

#[test]
fn test_ingest_counts_new_selectors_only() {
    let mut audit = audit();
    assert_eq!(audit.ingest(".something {}"), 1);
    assert_eq!(audit.ingest(".something { margin: 0 }"), 0);
    assert_eq!(audit.ingest(".something, .else {}"), 1);
    assert_eq!(audit.total_selectors(), 2);

    let id = audit.tree().lookup(".something").unwrap();
    assert_eq!(audit.tree().get(id).unwrap().original_selectors().len(), 3);
    // Reported once even though authored three times.
    assert_eq!(audit.unused_selectors(), vec![".something", ".else"]);
}

#[test]
fn test_equivalent_spellings_share_a_node() {
    let mut audit = audit();
    assert_eq!(audit.ingest(".btn {} .btn:hover {} .btn::after {} .btn  {}"), 1);
    assert_eq!(audit.unused_selectors(), vec![".btn", ".btn:hover", ".btn::after"]);

    let _ = audit.process("<a class=btn>go</a>");
    assert!(audit.selectors_to_review().is_empty());
}

#[test]
fn test_synthetic_prefixes_are_not_reported() {
    let mut audit = audit_with("nav ul li a { color: red }");
    assert_eq!(audit.total_selectors(), 1);
    assert!(audit.tree().lookup("nav ul").is_some());

    let events = audit.process("<nav><ul><li>plain</li></ul></nav>");
    assert!(events.is_empty());
    assert_eq!(audit.selectors_to_review(), vec!["nav ul li a"]);
}

#[test]
fn test_unsupported_selectors_are_reported() {
    let mut audit = audit_with("*:click { color: red } .used {}");
    let events = audit.process("<p class=used></p>");

    assert_eq!(audit.unsupported_selectors(), vec!["*:click"]);
    assert_eq!(audit.selectors_to_review(), vec!["*:click"]);
    assert!(events.iter().any(|e| matches!(
        e,
        AuditEvent::SelectorRejected { selector, .. } if selector == "*:click"
    )));
    assert!(events.contains(&AuditEvent::SelectorMatched {
        selector: ".used".to_string()
    }));
}

#[test]
fn test_at_rules_are_unsupported_without_testing() {
    let mut audit = audit_with("@font-face { font-family: X } @keyframes spin { to { top: 0 } } .a {}");
    assert_eq!(audit.total_selectors(), 3);
    assert_eq!(audit.unsupported_selectors(), vec!["@font-face", "@keyframes spin"]);

    let events = audit.process("<p class=a></p>");
    assert_eq!(
        events,
        vec![AuditEvent::SelectorMatched {
            selector: ".a".to_string()
        }]
    );
}

#[test]
fn test_media_rules_are_audited() {
    let mut audit = audit_with("@media print { .print-only { display: block } } .screen {}");
    let _ = audit.process("<div class=screen></div>");
    assert_eq!(audit.selectors_to_review(), vec![".print-only"]);
}

#[test]
fn test_pseudo_element_only_selector_matches_anything() {
    let mut audit = audit_with("::selection { color: red }");
    let _ = audit.process("<p>x</p>");
    assert!(audit.selectors_to_review().is_empty());
}

#[test]
fn test_ignore_patterns() {
    let config = AuditConfig {
        ignore: vec!["^\\.js-".to_string(), "^a>b$".to_string()],
        ..AuditConfig::default()
    };
    let mut audit = Audit::new(config).unwrap();
    assert_eq!(audit.ingest(".js-toggle {} .kept {} a   >   b {}"), 1);
    assert_eq!(audit.selectors_to_review(), vec![".kept"]);
}

#[test]
fn test_invalid_ignore_pattern_is_an_error() {
    let config = AuditConfig {
        ignore: vec!["(".to_string()],
        ..AuditConfig::default()
    };
    assert!(matches!(Audit::new(config), Err(ConfigError::Pattern(_))));
}

#[test]
fn test_late_ingestion_keeps_results() {
    let mut audit = audit_with(".a {}");
    let _ = audit.process("<p class=a><span class=b></span></p>");

    // `.a .b` goes under the already-used `.a` and is tested next time.
    assert_eq!(audit.ingest(".a .b {}"), 1);
    assert_eq!(audit.selectors_to_review(), vec![".a .b"]);
    let _ = audit.process("<p class=a><span class=b></span></p>");
    assert!(audit.selectors_to_review().is_empty());
}

#[test]
fn test_classification_is_exposed() {
    let mut audit = audit_with(STYLE);
    let _ = audit.process(INDEX);
    let tree = audit.tree();
    let state = |selector: &str| {
        audit
            .reduction()
            .classify(tree, tree.lookup(selector).unwrap())
    };
    assert_eq!(state("#foo"), SelectorState::Used);
    assert_eq!(state("#foo .bar .baz"), SelectorState::Unused);
}

#[test]
fn test_report_and_dump() {
    let mut audit = audit_with(STYLE);
    let _ = audit.process(INDEX);

    let mut report = Vec::new();
    audit.report(&mut report, &Palette::plain()).unwrap();
    assert_eq!(
        String::from_utf8(report).unwrap(),
        "\nfound 1 unused and 0 unsupported selectors out of 3 total\n\n"
    );

    let mut dump = Vec::new();
    audit.dump(&mut dump, false).unwrap();
    assert_eq!(String::from_utf8(dump).unwrap(), "#foo .bar .baz\n");

    let mut rules = Vec::new();
    audit.dump(&mut rules, true).unwrap();
    assert_eq!(
        String::from_utf8(rules).unwrap(),
        "#foo .bar .baz { color: blue }\n"
    );
}

#[test]
fn test_unsupported_selectors_are_labeled_in_report_and_dump() {
    let mut audit = audit_with(".gone { top: 0 } *:click { color: red } .used {}");
    let _ = audit.process("<p class=used></p>");

    let mut report = Vec::new();
    audit.report(&mut report, &Palette::plain()).unwrap();
    assert_eq!(
        String::from_utf8(report).unwrap(),
        "\nfound 1 unused and 1 unsupported selectors out of 3 total\n  unsupported: *:click\n\n"
    );

    let mut dump = Vec::new();
    audit.dump(&mut dump, false).unwrap();
    assert_eq!(
        String::from_utf8(dump).unwrap(),
        ".gone\n/* unsupported */\n*:click\n"
    );

    let mut rules = Vec::new();
    audit.dump(&mut rules, true).unwrap();
    assert_eq!(
        String::from_utf8(rules).unwrap(),
        ".gone { top: 0 }\n/* unsupported */\n*:click { color: red }\n"
    );

    let states: Vec<_> = audit.unused_rules().iter().map(|rule| rule.state).collect();
    assert_eq!(states, vec![SelectorState::Unused, SelectorState::Unsupported]);
}

#[test]
fn test_dump_without_unsupported_has_no_heading() {
    let mut audit = audit_with(".gone {}");
    let _ = audit.process("<p></p>");
    let mut dump = Vec::new();
    audit.dump(&mut dump, false).unwrap();
    assert_eq!(String::from_utf8(dump).unwrap(), ".gone\n");
}

#[test]
fn test_escaped_class_then_descendant_is_used() {
    let mut audit = audit_with(".\\31  a { color: red } .\\31 a { top: 0 }");
    let _ = audit.process("<p class=1><a>x</a></p>");
    assert_eq!(audit.selectors_to_review(), vec![".\\31 a"]);
}

#[test]
fn test_non_ascii_class_is_not_pruned_under_its_prefix() {
    let mut audit = audit_with(".a {} .a★ {}");
    let _ = audit.process("<p class=\"a★\"></p>");
    assert_eq!(audit.selectors_to_review(), vec![".a"]);
}

#[test]
fn test_run_loads_sources_from_root() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("style.css"), STYLE).unwrap();
    fs::write(dir.path().join("index.html"), INDEX).unwrap();

    let config = AuditConfig {
        root: format!("{}/", dir.path().display()),
        stylesheets: vec!["style.css".to_string(), "missing.css".to_string()],
        pages: vec![
            PageSource::from("index.html"),
            PageSource::from("missing.html"),
            PageSource::Inline {
                html: "<div id=foo><p class=bar><b class=baz></b></p></div>".to_string(),
            },
        ],
        rules: ".extra {}".to_string(),
        ..AuditConfig::default()
    };
    let mut audit = Audit::new(config).unwrap();
    let run = audit.run();

    assert_eq!(run.to_review, vec![".extra"]);
    assert!(run.events.contains(&AuditEvent::StylesheetLoaded {
        location: "style.css".to_string(),
        new_selectors: 3,
    }));
    assert!(run.events.contains(&AuditEvent::ExtraRulesLoaded { new_selectors: 1 }));
    let failed: Vec<_> = run
        .events
        .iter()
        .filter_map(|e| match e {
            AuditEvent::SourceFailed { location, error } => Some((location.as_str(), error)),
            _ => None,
        })
        .collect();
    assert_eq!(failed.len(), 2);
    assert_eq!(failed[0].0, "missing.css");
    assert!(failed[0].1.ends_with("missing.css was not found"));
    assert_eq!(failed[1].0, "missing.html");
    assert!(run.events.contains(&AuditEvent::PageStarted {
        location: "<inline html>".to_string()
    }));
}

#[test]
fn test_run_resets_previous_state() {
    let config = AuditConfig {
        rules: ".x {}".to_string(),
        ..AuditConfig::default()
    };
    let mut audit = Audit::new(config).unwrap();
    let _ = audit.ingest(".stale {}");
    let run = audit.run();
    assert_eq!(run.to_review, vec![".x"]);
}

#[test]
fn test_config_from_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chaff.json");
    fs::write(
        &path,
        r#"{
            "root": "site/",
            "stylesheets": ["a.css"],
            "pages": ["index.html", { "html": "<p></p>" }],
            "ignore": ["^\\.js-"],
            "pseudo": { "inferable_pseudo_classes": ["hover", "focus"] }
        }"#,
    )
    .unwrap();

    let config = AuditConfig::from_json_file(&path).unwrap();
    assert_eq!(config.root, "site/");
    assert_eq!(config.stylesheets, vec!["a.css"]);
    assert_eq!(
        config.pages,
        vec![
            PageSource::Location("index.html".to_string()),
            PageSource::Inline {
                html: "<p></p>".to_string()
            },
        ]
    );
    assert_eq!(config.pseudo.inferable_pseudo_classes, vec!["hover", "focus"]);
    assert!(config.pseudo.strip_pseudo_elements);
    assert_eq!(config.implication.word_chars, vec!['-', '\\']);
    assert!(config.rules.is_empty());
}

#[test]
fn test_config_errors() {
    assert!(matches!(
        AuditConfig::from_json_file("/definitely/not/here.json"),
        Err(ConfigError::Io { .. })
    ));
    assert!(matches!(
        AuditConfig::from_json_str("{ \"pages\": 3 }"),
        Err(ConfigError::Json(_))
    ));
}

const PAGES: &[&str] = &[
    "<div id=foo></div>",
    "<div id=foo><p class=bar></p></div>",
    "<div id=foo><p class=bar><span class=baz></span></p></div>",
    "<ul><li class=item><a href=/>x</a></li></ul>",
    "<ul class=menu><li>a</li><li class=item>b</li></ul>",
    "<section><h1 class=title>t</h1><p>x</p></section>",
    "<p class=bar></p>",
];

const CORPUS_CSS: &str = "
    #foo {} #foo .bar {} #foo .bar .baz {} .bar {}
    ul li {} ul li a {} ul.menu > li + li.item {} .item a:hover {}
    section h1.title ~ p {} h1 + p::first-line {} *:click {} :not(p) > span.baz {}
    @font-face { font-family: X }
";

/// A sequence of page indices into `PAGES`.
#[derive(Debug, Clone)]
struct Corpus(Vec<usize>);

impl Arbitrary for Corpus {
    fn arbitrary(g: &mut Gen) -> Self {
        let len = usize::arbitrary(g) % 6;
        Self((0..len).map(|_| usize::arbitrary(g) % PAGES.len()).collect())
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        Box::new(self.0.shrink().map(Corpus))
    }
}

fn review_after(pages: impl Iterator<Item = usize>) -> Vec<String> {
    let mut audit = audit_with(CORPUS_CSS);
    for page in pages {
        let _ = audit.process(PAGES[page]);
    }
    audit.selectors_to_review()
}

#[quickcheck]
fn prop_result_does_not_depend_on_page_order(corpus: Corpus) -> bool {
    review_after(corpus.0.iter().copied()) == review_after(corpus.0.iter().rev().copied())
}

#[quickcheck]
fn prop_processing_a_page_twice_changes_nothing(corpus: Corpus) -> bool {
    let once = review_after(corpus.0.iter().copied());
    let twice = review_after(corpus.0.iter().flat_map(|&p| [p, p]));
    once == twice
}

#[quickcheck]
fn prop_partitions_cover_every_selector(corpus: Corpus) -> bool {
    let mut audit = audit_with(CORPUS_CSS);
    for &page in &corpus.0 {
        let _ = audit.process(PAGES[page]);
    }
    let unused = audit.unused_selectors();
    let unsupported = audit.unsupported_selectors();
    unused.iter().all(|s| !unsupported.contains(s))
        && audit.total_selectors() >= unused.len() + unsupported.len()
}
