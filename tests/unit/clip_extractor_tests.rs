/*!
 * Tests for clip source extraction and canonicalization
 */

use readcast::clips::extract_clip_sources;

const ID_A: &str = "dQw4w9WgXcQ";
const ID_B: &str = "abc123XYZ_-";

#[test]
fn test_extract_clip_sources_withThreeShapes_shouldCollapseToOne() {
    let markup = format!(
        r#"<p>watch <a href="https://www.youtube.com/watch?v={id}">here</a></p>
           <p>or <a href="https://youtu.be/{id}">here</a></p>
           <iframe src="https://www.youtube.com/embed/{id}"></iframe>"#,
        id = ID_A
    );

    let sources = extract_clip_sources(&markup);
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].id, ID_A);
    assert_eq!(
        sources[0].url,
        format!("https://www.youtube.com/watch?v={}", ID_A)
    );
}

#[test]
fn test_extract_clip_sources_withTwoDistinctIds_shouldReturnBothInOrder() {
    let markup = format!(
        r#"<a href="https://www.youtube.com/watch?v={}">first</a>
           <a href="https://youtu.be/{}">second</a>"#,
        ID_A, ID_B
    );

    let sources = extract_clip_sources(&markup);
    assert_eq!(sources.len(), 2);
    assert_eq!(sources[0].id, ID_A);
    assert_eq!(sources[1].id, ID_B);
}

#[test]
fn test_extract_clip_sources_withParamsBeforeId_shouldStillMatch() {
    let markup = format!(
        r#"<a href="https://www.youtube.com/watch?t=42&v={}">deep link</a>"#,
        ID_A
    );

    let sources = extract_clip_sources(&markup);
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].id, ID_A);
}

#[test]
fn test_extract_clip_sources_withDuplicates_shouldKeepFirstSeenOrder() {
    let markup = format!(
        r#"<a href="https://youtu.be/{b}">b</a>
           <a href="https://www.youtube.com/watch?v={a}">a</a>
           <iframe src="https://www.youtube.com/embed/{b}"></iframe>"#,
        a = ID_A,
        b = ID_B
    );

    let sources = extract_clip_sources(&markup);
    assert_eq!(sources.len(), 2);
    assert_eq!(sources[0].id, ID_B);
    assert_eq!(sources[1].id, ID_A);
}

#[test]
fn test_extract_clip_sources_withoutClips_shouldReturnEmpty() {
    let markup = "<p>Just text, a <a href=\"https://example.com/page\">link</a>, no videos.</p>";
    assert!(extract_clip_sources(markup).is_empty());
}
