mod common;

use common::{app, attrs, record, scratch_dir, FakeLookup, RecordingExporter, CDN_URL};
use std::sync::Arc;
use std::time::Duration;
use thumbnail_renderer::networking::assets::AssetError;
use thumbnail_renderer::rendering::{ExportError, ObjectKind, SurfaceColor};
use thumbnail_renderer::world::{HexColor, RenderJob, RenderType};

fn user_job(pairs: &[(&str, &str)]) -> RenderJob {
    RenderJob::from_attributes(RenderType::User, &attrs(pairs)).unwrap()
}

fn preview_job(item: &str, item_type: &str) -> RenderJob {
    RenderJob::from_attributes(
        RenderType::Item,
        &attrs(&[("item", item), ("itemhash", "preview.png"), ("itemtype", item_type)]),
    )
    .unwrap()
}

#[tokio::test]
async fn test_bare_avatar_has_six_objects_and_no_lookups() {
    let lookup = Arc::new(FakeLookup::default());
    let exporter = Arc::new(RecordingExporter::default());
    let root = scratch_dir("bare");
    let app = app(lookup.clone(), exporter.clone(), &root, None);

    let report = app.render(&user_job(&[("hash", "bare.png")])).await.unwrap();

    assert_eq!(report.object_count, 6);
    assert_eq!(report.destination, root.join("thumbnails").join("bare.png"));
    assert!(lookup.calls().is_empty());

    let scene = exporter.last_scene();
    assert_eq!(
        scene.kinds(),
        vec![
            ObjectKind::Torso,
            ObjectKind::LeftArm,
            ObjectKind::LeftLeg,
            ObjectKind::RightLeg,
            ObjectKind::Head,
            ObjectKind::Arm,
        ]
    );
    for object in &scene.objects {
        assert_eq!(object.color, SurfaceColor::Hex(HexColor::default()));
    }
    let head = &scene.objects[4];
    assert_eq!(
        head.texture.as_ref().map(|t| t.url().to_string()),
        Some(format!("{}/assets/DefaultFace.png", CDN_URL))
    );
    assert_eq!(scene.objects[5].mesh.url(), format!("{}/assets/RightArm.obj", CDN_URL));

    std::fs::remove_dir_all(root).unwrap();
}

#[tokio::test]
async fn test_full_avatar_layering_order() {
    let lookup = Arc::new(
        FakeLookup::default()
            .with_item("10")
            .with_item("11")
            .with_item("12")
            .with_item("20")
            .with_item("30")
            .with_item("31")
            .with_item("32")
            .with_item("33"),
    );
    let exporter = Arc::new(RecordingExporter::default());
    let root = scratch_dir("order");
    let app = app(lookup.clone(), exporter.clone(), &root, None);

    let job = user_job(&[
        ("hash", "full.png"),
        ("hat_1", "10"),
        ("hat_3", "11"),
        ("hat_6", "12"),
        ("tool", "20"),
        ("face", "30"),
        ("shirt", "31"),
        ("tshirt", "32"),
        ("pants", "33"),
        ("torso_color", "112233"),
    ]);
    app.render(&job).await.unwrap();

    let scene = exporter.last_scene();
    assert_eq!(
        scene.kinds(),
        vec![
            ObjectKind::Torso,
            ObjectKind::LeftArm,
            ObjectKind::LeftLeg,
            ObjectKind::RightLeg,
            ObjectKind::TShirt,
            ObjectKind::Head,
            ObjectKind::Hat(0),
            ObjectKind::Hat(2),
            ObjectKind::Hat(5),
            ObjectKind::Tool,
            ObjectKind::Arm,
        ]
    );

    let torso = &scene.objects[0];
    assert_eq!(torso.color, SurfaceColor::Hex(HexColor::new("112233")));
    assert_eq!(
        torso.texture.as_ref().map(|t| t.url()),
        Some("http://api.test/v1/assets/get/t31")
    );
    let arm = scene.objects.last().unwrap();
    assert_eq!(arm.mesh.url(), format!("{}/assets/ArmHold.obj", CDN_URL));
    assert_eq!(arm.texture, torso.texture);
    assert_eq!(scene.objects[4].color, SurfaceColor::Transparent);
    assert_eq!(scene.objects[6].mesh.url(), "http://api.test/v1/assets/get/m10");

    // The shirt is looked up for the torso and again for the tool-clause arm
    let mut expected = vec!["10", "11", "12", "20", "30", "31", "31", "32", "33"];
    expected.sort();
    assert_eq!(lookup.calls(), expected);

    std::fs::remove_dir_all(root).unwrap();
}

#[tokio::test]
async fn test_unresolved_slots_are_dropped_not_fatal() {
    let lookup = Arc::new(
        FakeLookup::default()
            .with("1", Err(AssetError::Timeout))
            .with("2", Ok(vec![]))
            .with("3", Ok(vec![record("", "asset://t3")]))
            .with("4", Err(AssetError::Transport { reason: "refused".to_string() })),
    );
    let exporter = Arc::new(RecordingExporter::default());
    let root = scratch_dir("dropped");
    let app = app(lookup.clone(), exporter.clone(), &root, None);

    let job = user_job(&[
        ("hash", "partial.png"),
        ("hat_1", "1"),
        ("hat_2", "2"),
        ("hat_3", "3"),
        ("tshirt", "4"),
        ("face", "4"),
    ]);
    let report = app.render(&job).await.unwrap();

    assert_eq!(report.object_count, 7);
    let scene = exporter.last_scene();
    let tshirt = &scene.objects[4];
    assert_eq!(tshirt.kind, ObjectKind::TShirt);
    assert_eq!(tshirt.texture, None);
    assert!(scene.kinds().iter().all(|kind| !matches!(kind, ObjectKind::Hat(_))));
    assert_eq!(
        scene.objects[5].texture.as_ref().map(|t| t.url().to_string()),
        Some(format!("{}/assets/DefaultFace.png", CDN_URL))
    );

    std::fs::remove_dir_all(root).unwrap();
}

#[tokio::test]
async fn test_tool_slot_controls_arm_pose() {
    // Occupied but unresolvable: holding pose, no tool object
    let lookup = Arc::new(FakeLookup::default().with("77", Err(AssetError::Status { status: 500 })));
    let exporter = Arc::new(RecordingExporter::default());
    let root = scratch_dir("tool");
    let app = app(lookup.clone(), exporter.clone(), &root, None);

    app.render(&user_job(&[("hash", "tool.png"), ("tool", "77")])).await.unwrap();

    let scene = exporter.last_scene();
    assert!(!scene.kinds().contains(&ObjectKind::Tool));
    let arm = scene.objects.last().unwrap();
    assert_eq!(arm.kind, ObjectKind::Arm);
    assert_eq!(arm.mesh.url(), format!("{}/assets/ArmHold.obj", CDN_URL));
    assert_eq!(lookup.calls(), vec!["77"]);

    std::fs::remove_dir_all(root).unwrap();
}

#[tokio::test]
async fn test_arm_colours_are_crossed() {
    let lookup = Arc::new(FakeLookup::default());
    let exporter = Arc::new(RecordingExporter::default());
    let root = scratch_dir("colours");
    let app = app(lookup, exporter.clone(), &root, None);

    let job = user_job(&[
        ("hash", "colours.png"),
        ("leftArm_color", "aaaaaa"),
        ("rightArm_color", "bbbbbb"),
    ]);
    app.render(&job).await.unwrap();

    let scene = exporter.last_scene();
    assert_eq!(scene.objects[1].kind, ObjectKind::LeftArm);
    assert_eq!(scene.objects[1].color, SurfaceColor::Hex(HexColor::new("bbbbbb")));
    assert_eq!(scene.objects[5].kind, ObjectKind::Arm);
    assert_eq!(scene.objects[5].color, SurfaceColor::Hex(HexColor::new("aaaaaa")));

    std::fs::remove_dir_all(root).unwrap();
}

#[tokio::test]
async fn test_hat_preview_uses_first_hat_slot() {
    let lookup = Arc::new(FakeLookup::default().with_item("42"));
    let exporter = Arc::new(RecordingExporter::default());
    let root = scratch_dir("hat-preview");
    let app = app(lookup.clone(), exporter.clone(), &root, None);

    let report = app.render(&preview_job("42", "hat")).await.unwrap();

    assert_eq!(report.object_count, 7);
    assert_eq!(report.destination, root.join("thumbnails").join("preview.png"));
    assert_eq!(lookup.calls(), vec!["42"]);

    let scene = exporter.last_scene();
    assert_eq!(scene.objects[5].kind, ObjectKind::Hat(0));
    assert_eq!(scene.objects[5].mesh.url(), "http://api.test/v1/assets/get/m42");
    assert_eq!(scene.objects[6].mesh.url(), format!("{}/assets/RightArm.obj", CDN_URL));

    std::fs::remove_dir_all(root).unwrap();
}

#[tokio::test]
async fn test_unknown_preview_type_renders_bare_avatar() {
    let lookup = Arc::new(FakeLookup::default().with_item("42"));
    let exporter = Arc::new(RecordingExporter::default());
    let root = scratch_dir("unknown-preview");
    let app = app(lookup.clone(), exporter.clone(), &root, None);

    let report = app.render(&preview_job("42", "gear")).await.unwrap();

    assert_eq!(report.object_count, 6);
    assert!(lookup.calls().is_empty());

    std::fs::remove_dir_all(root).unwrap();
}

#[tokio::test]
async fn test_repeated_render_is_identical() {
    let lookup = Arc::new(FakeLookup::default().with_item("5").with_item("6"));
    let exporter = Arc::new(RecordingExporter::default());
    let root = scratch_dir("repeat");
    let app = app(lookup, exporter.clone(), &root, None);

    let job = user_job(&[("hash", "same.png"), ("hat_2", "5"), ("tool", "6")]);
    app.render(&job).await.unwrap();
    app.render(&job).await.unwrap();

    let exports = exporter.exports();
    assert_eq!(exports.len(), 2);
    assert_eq!(exports[0], exports[1]);

    std::fs::remove_dir_all(root).unwrap();
}

#[tokio::test]
async fn test_escaping_output_name_is_rejected_before_lookups() {
    let lookup = Arc::new(FakeLookup::default().with_item("9"));
    let exporter = Arc::new(RecordingExporter::default());
    let root = scratch_dir("escape");
    let app = app(lookup.clone(), exporter.clone(), &root, None);

    for hash in ["../outside.png", "/etc/passwd", "a/../../b"] {
        let result = app.render(&user_job(&[("hash", hash), ("hat_1", "9")])).await;
        assert!(matches!(result, Err(ExportError::InvalidName { .. })), "{}", hash);
    }
    assert!(lookup.calls().is_empty());
    assert!(exporter.exports().is_empty());

    std::fs::remove_dir_all(root).unwrap();
}

#[tokio::test]
async fn test_nested_output_name_creates_directories() {
    let exporter = Arc::new(RecordingExporter::default());
    let root = scratch_dir("nested");
    let app = app(Arc::new(FakeLookup::default()), exporter, &root, None);

    let report = app.render(&user_job(&[("hash", "ab/cd/avatar.png")])).await.unwrap();

    assert!(root.join("thumbnails").join("ab").join("cd").is_dir());
    assert_eq!(report.destination, root.join("thumbnails/ab/cd/avatar.png"));

    std::fs::remove_dir_all(root).unwrap();
}

#[tokio::test]
async fn test_exporter_failure_surfaces() {
    let root = scratch_dir("export-failure");
    let app = app(
        Arc::new(FakeLookup::default()),
        Arc::new(RecordingExporter::failing()),
        &root,
        None,
    );

    let result = app.render(&user_job(&[("hash", "fail.png")])).await;
    assert!(matches!(result, Err(ExportError::Renderer { .. })));

    std::fs::remove_dir_all(root).unwrap();
}

#[tokio::test]
async fn test_repeated_identifier_is_looked_up_per_slot() {
    let lookup = Arc::new(FakeLookup::default().with_item("9"));
    let exporter = Arc::new(RecordingExporter::default());
    let root = scratch_dir("repeated-id");
    let app = app(lookup.clone(), exporter.clone(), &root, None);

    app.render(&user_job(&[("hash", "twin.png"), ("hat_1", "9"), ("hat_2", "9")]))
        .await
        .unwrap();

    assert_eq!(lookup.calls(), vec!["9", "9"]);
    let scene = exporter.last_scene();
    assert_eq!(&scene.kinds()[5..7], &[ObjectKind::Hat(0), ObjectKind::Hat(1)]);
    assert_eq!(scene.objects[5].mesh, scene.objects[6].mesh);

    std::fs::remove_dir_all(root).unwrap();
}

#[tokio::test]
async fn test_order_ignores_lookup_completion_order() {
    // Earlier slots answer last
    let lookup = Arc::new(
        FakeLookup::default()
            .with_item("1")
            .with_item("2")
            .with_item("3")
            .with_item("7")
            .with_item("8")
            .with_delay("1", Duration::from_millis(120))
            .with_delay("2", Duration::from_millis(80))
            .with_delay("8", Duration::from_millis(60))
            .with_delay("3", Duration::from_millis(40)),
    );
    let exporter = Arc::new(RecordingExporter::default());
    let root = scratch_dir("completion-order");
    let app = app(lookup.clone(), exporter.clone(), &root, None);

    let job = user_job(&[
        ("hash", "slow.png"),
        ("tshirt", "8"),
        ("hat_1", "1"),
        ("hat_2", "2"),
        ("hat_4", "3"),
        ("tool", "7"),
    ]);
    app.render(&job).await.unwrap();

    let scene = exporter.last_scene();
    assert_eq!(
        scene.kinds(),
        vec![
            ObjectKind::Torso,
            ObjectKind::LeftArm,
            ObjectKind::LeftLeg,
            ObjectKind::RightLeg,
            ObjectKind::TShirt,
            ObjectKind::Head,
            ObjectKind::Hat(0),
            ObjectKind::Hat(1),
            ObjectKind::Hat(3),
            ObjectKind::Tool,
            ObjectKind::Arm,
        ]
    );
    assert_eq!(scene.objects[6].mesh.url(), "http://api.test/v1/assets/get/m1");
    assert_eq!(scene.objects[8].mesh.url(), "http://api.test/v1/assets/get/m3");

    std::fs::remove_dir_all(root).unwrap();
}
