//! Comprehensive tests for sieve-css
//!
//! End-to-end purge, critical and combine passes plus the ordering and
//! conservation properties every pass must keep.

use sieve_css::{
    Block, CriticalSet, DocumentKind, MatchPolicy, MatchReason, SourceDocument, UsageSet,
    build_usage_set, combine, combine_css, critical_css, match_reason, partition, purge_css,
    tokenize,
};

fn classes(names: &[&str]) -> UsageSet {
    let mut usage = UsageSet::new();
    usage.classes.extend(names.iter().map(|s| s.to_string()));
    usage
}

fn is_increasing(blocks: &[Block]) -> bool {
    blocks.windows(2).all(|w| w[0].source_order < w[1].source_order)
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_purge_unused_class() {
    let result = purge_css(".a{color:red}.b{color:blue}", &classes(&["a"]), &MatchPolicy::default());
    assert_eq!(result.kept_css(), ".a{color:red}");
    assert_eq!(result.dropped_css(), ".b{color:blue}");
}

#[test]
fn test_combine_equivalent_media() {
    let combined = combine_css(
        "@media (max-width:768px){.a{color:red}} @media screen and (max-width: 768px){.b{color:blue}}",
    );
    assert_eq!(combined.merged_count, 1);
    assert_eq!(combined.blocks.len(), 1);
    assert_eq!(combined.blocks[0].prelude, "@media (max-width:768px)");
    assert_eq!(
        combined.to_css(),
        "@media (max-width:768px){.a{color:red}.b{color:blue}}"
    );
}

#[test]
fn test_root_variables_preserved() {
    let policy = MatchPolicy::default().preserve_variables(true);
    let result = purge_css(":root{--x:1}.unused{color:red}", &UsageSet::new(), &policy);
    assert_eq!(result.kept_css(), ":root{--x:1}");
    assert_eq!(result.dropped_css(), ".unused{color:red}");
}

#[test]
fn test_hover_rule_preserved() {
    let policy = MatchPolicy::default().preserve_pseudo(true);
    let blocks = tokenize(".a:hover{color:red}");
    assert_eq!(
        match_reason(&blocks[0], &UsageSet::new(), &policy),
        Some(MatchReason::Pseudo)
    );
    let result = partition(&blocks, &UsageSet::new(), &policy);
    assert_eq!(result.kept.len(), 1);
    assert!(result.dropped.is_empty());
}

#[test]
fn test_unterminated_rule_yields_nothing() {
    assert!(tokenize(".a{color:red").is_empty());
    let result = purge_css(".a{color:red", &classes(&["a"]), &MatchPolicy::default());
    assert!(result.kept.is_empty());
    assert!(result.dropped.is_empty());
}

#[test]
fn test_safelist_glob() {
    let policy = MatchPolicy::default().with_safelist(["keep-*"]).unwrap();
    let result = purge_css(".keep-me{color:green}", &UsageSet::new(), &policy);
    assert_eq!(result.kept_css(), ".keep-me{color:green}");
}

// ============================================================================
// Properties
// ============================================================================

const STYLESHEET: &str = r#"
    @charset "utf-8";
    @import url(base.css);
    :root { --brand: #333; }
    html, body { margin: 0; }
    .nav { display: flex; }
    .nav a:hover { color: var(--brand); }
    .card { padding: 1rem; }
    .card .title { font-weight: bold; }
    .unused { color: red; }
    #main { max-width: 60rem; }
    #sidebar { width: 20rem; }
    @media (max-width: 768px) { .nav { display: block; } .legacy { float: left; } }
    @media screen and (max-width:768px) { .card { padding: .5rem; } }
    @supports (display: grid) { @media print { .grid { display: grid; } } }
    @font-face { font-family: Brand; src: url(brand.woff2); }
    @keyframes fade { from { opacity: 0 } to { opacity: 1 } }
    .footer { padding: 2rem; }
"#;

fn site_usage() -> UsageSet {
    let docs = vec![
        SourceDocument::new(
            "index.html",
            r#"<html><body><nav class="nav"><a href="/">Home</a></nav>
               <main id="main"><div class="card"><h2 class="title">Hi</h2></div></main></body></html>"#,
            DocumentKind::Markup,
        ),
        SourceDocument::new("app.js", "el.classList.add('is-open')", DocumentKind::ComponentScript),
    ];
    build_usage_set(&docs)
}

#[test]
fn test_partition_conservation() {
    let blocks = tokenize(STYLESHEET);
    let result = partition(&blocks, &site_usage(), &MatchPolicy::default());
    assert_eq!(result.kept.len() + result.dropped.len(), blocks.len());
}

#[test]
fn test_partition_order_preserved() {
    let blocks = tokenize(STYLESHEET);
    let result = partition(&blocks, &site_usage(), &MatchPolicy::default());
    assert!(is_increasing(&result.kept));
    assert!(is_increasing(&result.dropped));
    assert!(is_increasing(&result.pruned));
}

#[test]
fn test_partition_idempotent() {
    let usage = site_usage();
    let policy = MatchPolicy::default();
    let first = partition(&tokenize(STYLESHEET), &usage, &policy);
    let second = partition(&first.kept, &usage, &policy);
    assert_eq!(second.kept, first.kept);
    assert!(second.dropped.is_empty());
}

#[test]
fn test_partition_reparse_idempotent() {
    let usage = site_usage();
    let policy = MatchPolicy::default();
    let kept_css = purge_css(STYLESHEET, &usage, &policy).kept_css();
    let again = purge_css(&kept_css, &usage, &policy);
    assert!(again.dropped.is_empty());
    assert!(again.pruned.is_empty());
    assert_eq!(again.kept_css(), kept_css);
}

#[test]
fn test_site_purge_contents() {
    let result = purge_css(STYLESHEET, &site_usage(), &MatchPolicy::default());
    let kept = result.kept_css();
    let dropped = result.dropped_css();

    for expected in [
        "@charset",
        "@import",
        ":root",
        "html, body",
        ".nav a:hover",
        ".card .title",
        "#main",
        "@font-face",
        "@keyframes fade",
    ] {
        assert!(kept.contains(expected), "missing {expected} in kept CSS");
    }
    for expected in [".unused", "#sidebar", ".legacy", ".grid", ".footer"] {
        assert!(dropped.contains(expected), "missing {expected} in dropped CSS");
        assert!(!kept.contains(expected), "{expected} should not be kept");
    }

    let stats = result.stats();
    assert_eq!(stats.original_rules, stats.kept_rules + stats.dropped_rules);
    assert_eq!(
        stats.removed_selectors,
        vec![".unused", "#sidebar", ".legacy", ".grid", ".footer"]
    );
}

#[test]
fn test_combiner_idempotent() {
    let once = combine(&tokenize(STYLESHEET));
    assert_eq!(once.merged_count, 1);
    let twice = combine(&once.blocks);
    assert_eq!(twice.merged_count, 0);
    assert_eq!(twice.blocks, once.blocks);
}

#[test]
fn test_combiner_counts_occurrences() {
    let css = "@media print{.a{x:1}}@media print{.b{x:1}}@media print{.c{x:1}}\
               @media (min-width:1px){.d{x:1}}@media (min-width: 1px){.e{x:1}}";
    let combined = combine_css(css);
    assert_eq!(combined.merged_count, (3 - 1) + (2 - 1));
    assert_eq!(combined.groups.len(), 2);
    assert_eq!(combined.groups[0].occurrence_count, 3);
    assert_eq!(combined.groups[1].normalized_key, "(min-width:1px)");
}

// ============================================================================
// Critical CSS
// ============================================================================

#[test]
fn test_critical_split() {
    let html = r#"<!doctype html><html><head><link rel="stylesheet" href="site.css"></head>
        <body><header class="masthead"><h1 id="logo">Site</h1></header>
        <section class="hero"><p>Welcome</p></section>
        <footer class="site-footer">bye</footer></body></html>"#;
    let css = "body{margin:0}.masthead{height:4rem}#logo{font-size:2rem}.hero{padding:2rem}\
               .site-footer{color:gray}.article{columns:2}";

    let result = critical_css(css, html, &MatchPolicy::default());
    assert_eq!(
        result.kept_css(),
        "body{margin:0}\n.masthead{height:4rem}\n#logo{font-size:2rem}\n.hero{padding:2rem}"
    );
    assert_eq!(result.dropped_css(), ".site-footer{color:gray}\n.article{columns:2}");
}

#[test]
fn test_critical_set_selectors() {
    let html = r#"<body><header class="top"></header><main id="content"></main></body>"#;
    let set = CriticalSet::from_markup(html, &MatchPolicy::default());
    assert_eq!(set.selectors(), &["html", "body", "header", ".top", "main", "#content"]);
}
