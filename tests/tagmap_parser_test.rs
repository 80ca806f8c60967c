//! Tagmap grammar tests through the public compiler API.

use std::io::Write;

use tagmail::{TagmapCompiler, TagmailError, WILDCARD_TAG};

fn reason(err: TagmailError) -> String {
    match err {
        TagmailError::MalformedRule { reason, .. } => reason,
        other => panic!("Expected MalformedRule, got {other:?}"),
    }
}

#[test]
fn test_full_tagmap() {
    let text = "\
# Puppet tagmail configuration

ops@example.com,oncall@example.com: all,!noisy
web@example.com web2@example.com: nginx, apache   # web tier
   dba@example.com :  mysql,mysql , !backup
";
    let rules = TagmapCompiler::new().compile(text).unwrap();
    assert_eq!(rules.len(), 3);

    let ops = &rules.rules[0];
    assert_eq!(ops.line, 3);
    assert_eq!(ops.recipients, vec!["ops@example.com", "oncall@example.com"]);
    assert!(ops.expression.is_wildcard());
    assert_eq!(ops.expression.negative, vec!["noisy"]);

    let web = &rules.rules[1];
    assert_eq!(web.recipients, vec!["web@example.com", "web2@example.com"]);
    assert_eq!(web.expression.positive, vec!["nginx", "apache"]);
    assert!(web.expression.negative.is_empty());

    let dba = &rules.rules[2];
    assert_eq!(dba.line, 5);
    assert_eq!(dba.expression.positive, vec!["mysql"]);
    assert_eq!(dba.expression.negative, vec!["backup"]);
}

#[test]
fn test_wildcard_is_reserved() {
    let rules = TagmapCompiler::new().compile("a@x: all").unwrap();
    assert_eq!(rules.rules[0].expression.positive, vec![WILDCARD_TAG]);

    let err = TagmapCompiler::new().compile("a@x: build, !all").unwrap_err();
    assert!(reason(err).contains("cannot be negated"));
}

#[test]
fn test_rejections() {
    let cases = [
        ("badline", "missing ':'"),
        ("a@x build # note: nightly", "missing ':'"),
        (": build", "no recipients"),
        ("a@x:", "empty tag list"),
        ("a@x: # only a comment", "empty tag list"),
        ("a@x: bad tag", "invalid tag"),
        ("a@x: build,,deploy", "invalid tag"),
        ("a@x: tag/with/slash", "invalid tag"),
        ("a@x: !noisy", "no positive tags"),
    ];

    for (line, expected) in cases {
        let err = TagmapCompiler::new().compile(line).unwrap_err();
        let got = reason(err);
        assert!(got.contains(expected), "{line:?}: {got:?} lacks {expected:?}");
    }
}

#[test]
fn test_error_reports_line_and_content() {
    let err = TagmapCompiler::new()
        .compile("a@x: build\n\n  b@x build  \n")
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Malformed rule on line 3 (\"  b@x build  \"): missing ':' between recipients and tags"
    );
}

#[test]
fn test_tag_characters() {
    let rules = TagmapCompiler::new()
        .compile("a@x: my-tag, os.linux, under_score, Nginx2")
        .unwrap();
    assert_eq!(
        rules.rules[0].expression.positive,
        vec!["my-tag", "os.linux", "under_score", "Nginx2"]
    );
}

#[test]
fn test_compile_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "# header").unwrap();
    writeln!(file, "a@x: build").unwrap();

    let rules = TagmapCompiler::new().compile_file(file.path()).unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules.rules[0].line, 2);
}

#[test]
fn test_compile_missing_file() {
    let err = TagmapCompiler::new()
        .compile_file("/nonexistent/tagmail.conf")
        .unwrap_err();
    assert!(matches!(err, TagmailError::IoError(_)));
}
