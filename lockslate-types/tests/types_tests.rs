use lockslate_types::{ContentKind, Role, SessionDescriptor};
use pretty_assertions::assert_eq;

#[test]
fn content_kind_from_extension() {
    assert_eq!(ContentKind::from_filename("lecture.pdf"), ContentKind::Document);
    assert_eq!(ContentKind::from_filename("slides.PPTX"), ContentKind::Document);
    assert_eq!(ContentKind::from_filename("demo.mp4"), ContentKind::Video);
    assert_eq!(ContentKind::from_filename("clip.MOV"), ContentKind::Video);
    assert_eq!(ContentKind::from_filename("diagram.png"), ContentKind::Image);
    assert_eq!(ContentKind::from_filename("data.csv"), ContentKind::Other);
    assert_eq!(ContentKind::from_filename("no-extension"), ContentKind::Other);
}

#[test]
fn content_kind_round_trips_through_column_value() {
    for kind in [
        ContentKind::Document,
        ContentKind::Video,
        ContentKind::Image,
        ContentKind::Other,
    ] {
        assert_eq!(ContentKind::parse(kind.as_str()), Some(kind));
    }
    assert_eq!(ContentKind::parse("audio"), None);
}

#[test]
fn role_parse_rejects_unknown() {
    assert_eq!(Role::parse("teacher"), Some(Role::Teacher));
    assert_eq!(Role::parse("student"), Some(Role::Student));
    assert_eq!(Role::parse("admin"), None);
}

#[test]
fn descriptor_serializes_with_type_tag() {
    let desc = SessionDescriptor::Document {
        token: "tok-1".into(),
        pages: "/document/tok-1/pages".into(),
    };
    let json = serde_json::to_value(&desc).unwrap();
    assert_eq!(json["type"], "document");
    assert_eq!(json["token"], "tok-1");
    assert_eq!(json["pages"], "/document/tok-1/pages");

    let back: SessionDescriptor = serde_json::from_value(json).unwrap();
    assert_eq!(back, desc);
    assert_eq!(back.token(), "tok-1");
}

#[test]
fn video_descriptor_round_trip() {
    let json = serde_json::json!({
        "type": "video",
        "token": "tok-2",
        "playlist": "/video/tok-2/playlist.m3u8",
    });
    let desc: SessionDescriptor = serde_json::from_value(json).unwrap();
    assert_eq!(
        desc,
        SessionDescriptor::Video {
            token: "tok-2".into(),
            playlist: "/video/tok-2/playlist.m3u8".into(),
        }
    );
}
