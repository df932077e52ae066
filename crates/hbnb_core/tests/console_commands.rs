use hbnb_core::{
    CommandError, CommandOutput, Console, FileStore, MissingArgument, Record, RecordKind,
};
use std::io::Cursor;
use tempfile::TempDir;

fn console_in(dir: &TempDir) -> Console {
    Console::new(FileStore::open(dir.path().join("file.json")).unwrap())
}

fn created_id(console: &mut Console, class_name: &str) -> String {
    match console.execute(&format!("create {class_name}")).unwrap() {
        CommandOutput::Text(id) => id,
        other => panic!("unexpected output: {other:?}"),
    }
}

fn records(output: CommandOutput) -> Vec<String> {
    match output {
        CommandOutput::Records(items) => items,
        other => panic!("unexpected output: {other:?}"),
    }
}

#[test]
fn create_then_show_returns_representation_with_id() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = console_in(&dir);

    let id = created_id(&mut console, "User");
    let output = console.execute(&format!("show User {id}")).unwrap();

    match output {
        CommandOutput::Text(text) => {
            assert!(text.starts_with(&format!("[User] ({id})")));
            assert!(text.contains(&id));
        }
        other => panic!("unexpected output: {other:?}"),
    }
}

#[test]
fn create_persists_immediately() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = console_in(&dir);

    let id = created_id(&mut console, "Place");

    let reloaded = FileStore::open(dir.path().join("file.json")).unwrap();
    assert!(reloaded.get(&format!("Place.{id}")).is_some());
}

#[test]
fn create_requires_known_class_name() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = console_in(&dir);

    let err = console.execute("create").unwrap_err();
    assert!(matches!(err, CommandError::MissingArgument(MissingArgument::ClassName)));
    assert_eq!(err.to_string(), "** class name missing **");

    let err = console.execute("create MyModel").unwrap_err();
    assert!(matches!(err, CommandError::UnknownClass(name) if name == "MyModel"));
    assert!(console.store().is_empty());
}

#[test]
fn show_and_destroy_validate_arguments_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = console_in(&dir);

    for verb in ["show", "destroy"] {
        let err = console.execute(verb).unwrap_err();
        assert_eq!(err.to_string(), "** class name missing **");

        let err = console.execute(&format!("{verb} Nope")).unwrap_err();
        assert_eq!(err.to_string(), "** class doesn't exist **");

        let err = console.execute(&format!("{verb} User")).unwrap_err();
        assert_eq!(err.to_string(), "** instance id missing **");

        let err = console.execute(&format!("{verb} User 1234")).unwrap_err();
        assert!(matches!(err, CommandError::NotFound(key) if key == "User.1234"));
    }
}

#[test]
fn show_requires_exact_class_for_id() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = console_in(&dir);

    let id = created_id(&mut console, "City");
    let err = console.execute(&format!("show State {id}")).unwrap_err();
    assert_eq!(err.to_string(), "** no instance found **");
}

#[test]
fn destroy_then_show_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = console_in(&dir);

    let id = created_id(&mut console, "Amenity");
    let output = console.execute(&format!("destroy Amenity {id}")).unwrap();
    assert_eq!(output, CommandOutput::Silent);

    let err = console.execute(&format!("show Amenity {id}")).unwrap_err();
    assert!(matches!(err, CommandError::NotFound(_)));

    let reloaded = FileStore::open(dir.path().join("file.json")).unwrap();
    assert!(reloaded.is_empty());
}

#[test]
fn all_lists_every_record_in_insertion_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = console_in(&dir);

    let first = created_id(&mut console, "User");
    let second = created_id(&mut console, "Place");
    let third = created_id(&mut console, "User");

    let items = records(console.execute("all").unwrap());
    assert_eq!(items.len(), console.store().len());
    assert!(items[0].contains(&first));
    assert!(items[1].contains(&second));
    assert!(items[2].contains(&third));
}

#[test]
fn all_with_class_filters_by_key_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = console_in(&dir);

    created_id(&mut console, "User");
    created_id(&mut console, "Place");
    created_id(&mut console, "User");

    let items = records(console.execute("all User").unwrap());
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|item| item.starts_with("[User] (")));

    let items = records(console.execute("all Review").unwrap());
    assert!(items.is_empty());

    let err = console.execute("all Galaxy").unwrap_err();
    assert!(matches!(err, CommandError::UnknownClass(_)));
}

#[test]
fn dotted_syntax_matches_canonical_form() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = console_in(&dir);

    created_id(&mut console, "User");
    created_id(&mut console, "City");

    let dotted = records(console.execute("User.all()").unwrap());
    let canonical = records(console.execute("all User").unwrap());
    assert_eq!(dotted, canonical);
    assert_eq!(dotted.len(), 1);

    assert_eq!(
        console.execute("City.count()").unwrap(),
        CommandOutput::Text("1".to_string())
    );
}

#[test]
fn update_sets_string_value_and_refreshes_updated_at() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = console_in(&dir);

    let id = created_id(&mut console, "User");
    let key = format!("User.{id}");
    let before = console.store().get(&key).unwrap().updated_at;
    std::thread::sleep(std::time::Duration::from_millis(2));

    let output = console
        .execute(&format!(r#"update User {id} first_name "Betty Bar""#))
        .unwrap();
    assert_eq!(output, CommandOutput::Silent);
    console
        .execute(&format!("update User {id} age 89"))
        .unwrap();

    let record = console.store().get(&key).unwrap();
    assert_eq!(record.attribute("first_name").as_deref(), Some("Betty Bar"));
    assert_eq!(record.extra.get("age"), Some(&serde_json::json!("89")));
    assert!(record.updated_at > before);

    let reloaded = FileStore::open(dir.path().join("file.json")).unwrap();
    let persisted = reloaded.get(&key).unwrap();
    assert_eq!(persisted.attribute("first_name").as_deref(), Some("Betty Bar"));
}

#[test]
fn dotted_update_keeps_multi_word_value() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = console_in(&dir);

    let id = created_id(&mut console, "Review");
    console
        .execute(&format!(r#"Review.update("{id}", "text", "Lovely little place")"#))
        .unwrap();

    let record = console.store().get(&format!("Review.{id}")).unwrap();
    assert_eq!(record.attribute("text").as_deref(), Some("Lovely little place"));
}

#[test]
fn dotted_update_accepts_empty_quoted_value() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = console_in(&dir);
    let id = created_id(&mut console, "State");
    console
        .execute(&format!("update State {id} name Nevada"))
        .unwrap();

    let output = console
        .execute(&format!(r#"State.update("{id}", "name", "")"#))
        .unwrap();
    assert_eq!(output, CommandOutput::Silent);

    let record = console.store().get(&format!("State.{id}")).unwrap();
    assert_eq!(record.attribute("name").as_deref(), Some(""));
}

#[test]
fn failed_save_rolls_back_create() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = Console::new(FileStore::new(dir.path()));

    let err = console.execute("create User").unwrap_err();
    assert!(matches!(err, CommandError::Storage(_)));
    assert!(console.store().is_empty());
    assert!(records(console.execute("all").unwrap()).is_empty());
}

#[test]
fn failed_save_rolls_back_destroy_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::new(dir.path());
    let first = Record::new(RecordKind::City);
    let second = Record::new(RecordKind::City);
    store.insert(first.clone());
    store.insert(second.clone());
    let mut console = Console::new(store);

    let err = console
        .execute(&format!("destroy City {}", first.id))
        .unwrap_err();
    assert!(matches!(err, CommandError::Storage(_)));

    let keys: Vec<&str> = console.store().all().map(|(key, _)| key).collect();
    assert_eq!(keys, vec![first.key().as_str(), second.key().as_str()]);
    assert_eq!(console.store().get(&first.key()), Some(&first));
}

#[test]
fn failed_save_rolls_back_update() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::new(dir.path());
    let record = Record::new(RecordKind::User);
    store.insert(record.clone());
    let mut console = Console::new(store);

    let err = console
        .execute(&format!("update User {} email a@b.io", record.id))
        .unwrap_err();
    assert!(matches!(err, CommandError::Storage(_)));
    assert_eq!(console.store().get(&record.key()), Some(&record));
}

#[test]
fn update_reports_each_missing_argument() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = console_in(&dir);
    let id = created_id(&mut console, "State");

    let cases = [
        ("update".to_string(), "** class name missing **"),
        ("update Moon".to_string(), "** class doesn't exist **"),
        ("update State".to_string(), "** instance id missing **"),
        ("update State 42".to_string(), "** no instance found **"),
        (format!("update State {id}"), "** attribute name missing **"),
        (format!("update State {id} name"), "** value missing **"),
    ];
    for (line, expected) in cases {
        let err = console.execute(&line).unwrap_err();
        assert_eq!(err.to_string(), expected, "line: {line}");
    }
}

#[test]
fn update_refuses_header_attributes() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = console_in(&dir);
    let id = created_id(&mut console, "User");

    let err = console
        .execute(&format!("update User {id} id 1234"))
        .unwrap_err();
    assert!(matches!(err, CommandError::ReadOnlyAttribute(name) if name == "id"));
    assert!(console.store().get(&format!("User.{id}")).is_some());
}

#[test]
fn unknown_class_is_rejected_by_every_handler() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = console_in(&dir);
    created_id(&mut console, "User");
    let stored_before = std::fs::read_to_string(dir.path().join("file.json")).unwrap();

    for line in [
        "create Ghost",
        "show Ghost 1",
        "destroy Ghost 1",
        "all Ghost",
        "update Ghost 1 name x",
        "count Ghost",
    ] {
        let err = console.execute(line).unwrap_err();
        assert!(matches!(err, CommandError::UnknownClass(_)), "line: {line}");
    }

    let stored_after = std::fs::read_to_string(dir.path().join("file.json")).unwrap();
    assert_eq!(stored_after, stored_before);
    assert_eq!(console.store().len(), 1);
}

#[test]
fn unknown_verb_and_blank_lines() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = console_in(&dir);

    assert_eq!(console.execute("   ").unwrap(), CommandOutput::Silent);
    let err = console.execute("fly User").unwrap_err();
    assert_eq!(err.to_string(), "*** Unknown syntax: fly User");
}

#[test]
fn help_lists_and_describes_verbs() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = console_in(&dir);

    match console.execute("help").unwrap() {
        CommandOutput::Text(text) => {
            for verb in ["all", "count", "create", "destroy", "show", "update", "quit"] {
                assert!(text.contains(verb), "missing {verb}");
            }
        }
        other => panic!("unexpected output: {other:?}"),
    }
    match console.execute("help show").unwrap() {
        CommandOutput::Text(text) => assert!(text.starts_with("Usage: show")),
        other => panic!("unexpected output: {other:?}"),
    }
}

#[test]
fn run_loop_prints_results_and_errors_until_quit() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = console_in(&dir);

    let input = Cursor::new("create\ncreate BaseModel\nall Nope\nquit\ncreate User\n");
    let mut output = Vec::new();
    console.run(input, &mut output, false).unwrap();

    let text = String::from_utf8(output).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "** class name missing **");
    assert_eq!(lines[1].len(), 36);
    assert_eq!(lines[2], "** class doesn't exist **");
    assert_eq!(console.store().len(), 1);
}

#[test]
fn run_loop_prompts_in_interactive_mode() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = console_in(&dir);

    let mut output = Vec::new();
    console
        .run(Cursor::new("all\n"), &mut output, true)
        .unwrap();

    let text = String::from_utf8(output).unwrap();
    assert_eq!(text, "(hbnb) []\n(hbnb) \n");
}

#[test]
fn handle_line_writes_output_and_signals_quit() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = console_in(&dir);
    let mut output = Vec::new();

    assert!(console.handle_line("count User", &mut output).unwrap());
    assert!(console.handle_line("show", &mut output).unwrap());
    assert!(console.handle_line("", &mut output).unwrap());
    assert!(!console.handle_line("quit", &mut output).unwrap());

    let text = String::from_utf8(output).unwrap();
    assert_eq!(text, "0\n** class name missing **\n");
}

#[test]
fn into_store_returns_live_state() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::new(dir.path().join("file.json"));
    store.insert(Record::new(RecordKind::User));
    let mut console = Console::new(store);

    created_id(&mut console, "City");
    let store = console.into_store();
    assert_eq!(store.len(), 2);
}
