use rustlinguist_catalog::{parse, serialize, MessageStatus, Translation, TsParseError};

/// Catalog shaped like a real extraction run: several contexts, repeated
/// locations, developer comments, a numerus entry, and escaped characters.
const FIXTURE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="2.1" language="en_US">
<context>
    <name>FilterWidget</name>
    <message>
        <location filename="filterwidget.cpp" line="610"/>
        <source>Filter options</source>
        <translation type="unfinished"></translation>
    </message>
    <message>
        <location filename="filterwidget.cpp" line="629"/>
        <source>Make regular expressions case sensitive (/i)</source>
        <extracomment>leave &quot;(/i)&quot; verbatim</extracomment>
        <translation type="unfinished"></translation>
    </message>
</context>
<context>
    <name>FindDialog</name>
    <message>
        <location filename="finddialog.ui" line="31"/>
        <location filename="finddialog.ui" line="34"/>
        <source>Search term</source>
        <translation type="unfinished"></translation>
    </message>
    <message>
        <location filename="finddialog.ui" line="53"/>
        <source>&amp;Find Next</source>
        <translation type="unfinished"></translation>
    </message>
</context>
<context>
    <name>QObject</name>
    <message>
        <location filename="pluginrequirements.cpp" line="34"/>
        <source>This plugin can only be enabled if the &apos;%1&apos; plugin is installed and enabled.</source>
        <translation type="unfinished"></translation>
    </message>
    <message numerus="yes">
        <location filename="pluginrequirements.cpp" line="63"/>
        <source>This plugin can only be enabled for the following game(s): %1.</source>
        <translation type="unfinished">
            <numerusform></numerusform>
            <numerusform></numerusform>
        </translation>
    </message>
    <message>
        <source>Filter</source>
        <translation type="obsolete">Filtern</translation>
    </message>
    <message>
        <source>h</source>
        <extracomment>Time remaining hours</extracomment>
        <translation>Std.</translation>
    </message>
</context>
</TS>
"#;

#[test]
fn canonical_catalogs_round_trip_byte_for_byte() {
    let catalog = parse(FIXTURE).expect("parse fixture");
    assert_eq!(serialize(&catalog), FIXTURE);
}

#[test]
fn parsed_structure_matches_the_document() {
    let catalog = parse(FIXTURE).expect("parse fixture");
    assert_eq!(catalog.language(), "en_US");
    let names: Vec<_> = catalog
        .contexts()
        .iter()
        .map(|context| context.name.as_str())
        .collect();
    assert_eq!(names, vec!["FilterWidget", "FindDialog", "QObject"]);

    let search_term = catalog
        .lookup("FindDialog", "Search term", None)
        .expect("merged locations");
    assert_eq!(search_term.locations.len(), 2);
    assert_eq!(search_term.locations[0].line, Some(31));
    assert_eq!(search_term.locations[1].line, Some(34));

    let numerus = catalog
        .lookup(
            "QObject",
            "This plugin can only be enabled for the following game(s): %1.",
            None,
        )
        .expect("numerus entry");
    assert_eq!(
        numerus.translation,
        Translation::Plural(vec![String::new(), String::new()])
    );

    let obsolete = catalog.lookup("QObject", "Filter", None).expect("kept");
    assert_eq!(obsolete.status, MessageStatus::Obsolete);

    let finished = catalog.lookup("QObject", "h", None).expect("translated");
    assert_eq!(finished.status, MessageStatus::Finished);
    assert_eq!(finished.extracomment.as_deref(), Some("Time remaining hours"));
}

#[test]
fn unknown_attributes_survive_a_round_trip() {
    let input = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="2.1" language="de_DE" revision="41">
<context>
    <name>Dialog</name>
    <message id="dialog.save">
        <source>Save</source>
        <translation>Speichern</translation>
    </message>
</context>
</TS>
"#;
    let catalog = parse(input).expect("parse");
    assert_eq!(
        catalog.extra_attributes(),
        &[("revision".to_string(), "41".to_string())]
    );
    let message = catalog.lookup("Dialog", "Save", None).expect("message");
    assert_eq!(
        message.extra,
        vec![("id".to_string(), "dialog.save".to_string())]
    );
    assert_eq!(serialize(&catalog), input);
}

#[test]
fn sourcelanguage_is_preserved() {
    let input = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="2.1" sourcelanguage="en_US" language="de_DE">
<context>
    <name>Dialog</name>
    <message>
        <source>Save</source>
        <translation type="unfinished"></translation>
    </message>
</context>
</TS>
"#;
    let catalog = parse(input).expect("parse");
    assert_eq!(catalog.source_language(), Some("en_US"));
    assert_eq!(serialize(&catalog), input);
}

#[test]
fn truncated_document_fails_with_unexpected_eof() {
    let cut = &FIXTURE[..FIXTURE.len() / 2];
    match parse(cut) {
        Err(TsParseError::UnexpectedEof) | Err(TsParseError::Malformed { .. }) => {}
        other => panic!("unexpected result: {other:?}"),
    }
    // A clean cut between elements is always UnexpectedEof.
    let clean_cut = &FIXTURE[..FIXTURE.find("<context>").expect("marker")];
    assert!(matches!(parse(clean_cut), Err(TsParseError::UnexpectedEof)));
}

#[test]
fn serializer_output_reparses_to_the_same_catalog() {
    let catalog = parse(FIXTURE).expect("parse");
    let written = serialize(&catalog);
    let reparsed = parse(&written).expect("reparse");
    assert_eq!(serialize(&reparsed), written);
}
