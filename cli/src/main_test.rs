use super::*;

fn decode_sample(module_namespace: &str) -> Arc<PropertyTable> {
    let bytes = protocol::encode_event(&sample_event(7));
    let model = InspectorModel::new(module_namespace, Arc::new(OfflineClient));
    let provider = PropertiesProvider::new(model);
    let event = protocol::decode_event(&bytes).expect("decode");
    let view = ViewNode::new(7, "android.widget.TextView").with_layout("@layout/activity_main");
    provider.decode_for(&event, &view)
}

#[test]
fn to_hex_renders_lowercase_pairs() {
    assert_eq!(to_hex(&[0x00, 0x0a, 0xff]), "000aff");
    assert_eq!(to_hex(&[]), "");
}

#[test]
fn request_hex_decodes_back_to_command() {
    let bytes = protocol::encode_command(&WireCommand::get_properties(12));
    let command = protocol::decode_command(&bytes).expect("decode");
    assert_eq!(command.view_id(), Some(12));
}

#[test]
fn sample_event_decodes_to_expected_table() {
    let table = decode_sample("com.example");
    assert_eq!(table.len(), 4);
    let width = table.get(inspector::ANDROID_NAMESPACE, "width").expect("width");
    assert_eq!(width.value.as_deref(), Some("wrap_content"));
    assert!(width.declared);
    let text = table.get(inspector::ANDROID_NAMESPACE, "text").expect("text");
    assert_eq!(text.value.as_deref(), Some("@string/app_name"));
}

#[test]
fn render_text_marks_declared_and_null_values() {
    let table = decode_sample("");
    let rendered = render_text(&table);
    assert_eq!(
        rendered,
        "  enabled = true\n\
         \x20 minHeight = <null>\n\
         * text = @com.example:string/app_name  [@layout/activity_main]\n\
         * width = wrap_content  [@layout/activity_main]\n"
    );
}

#[test]
fn cli_parses_decode_arguments() {
    let cli = Cli::try_parse_from([
        "inspector-cli",
        "--module-namespace",
        "com.example",
        "decode",
        "--input",
        "event.pb",
        "--view-id",
        "-3",
        "--format",
        "json",
    ])
    .expect("parse");
    assert_eq!(cli.module_namespace.as_deref(), Some("com.example"));
    match cli.command {
        Command::Decode {
            input,
            view_id,
            format,
            layout,
            ..
        } => {
            assert_eq!(input, "event.pb");
            assert_eq!(view_id, -3);
            assert_eq!(format, Format::Json);
            assert_eq!(layout, None);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}
