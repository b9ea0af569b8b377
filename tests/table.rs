use resdec::config::ConfigFlags;
use resdec::error::Error;
use resdec::res_value::Value;
use resdec::table::{
    ResId, ResPackage, ResResource, ResSpec, ResTable, ResTypeSpec, SpecOrigin,
};

fn fr() -> ConfigFlags {
    ConfigFlags {
        language: [b'f', b'r'],
        ..ConfigFlags::default()
    }
}

fn string_resource(text: &str) -> ResResource {
    ResResource {
        config: ConfigFlags::default(),
        value: Value::String(text.to_owned()),
    }
}

#[test]
fn res_id_partitioning() {
    let id = ResId::new(0x7f, 0x01, 0x1234);
    assert_eq!(id.0, 0x7f011234);
    assert_eq!(id.package_id(), 0x7f);
    assert_eq!(id.type_id(), 0x01);
    assert_eq!(id.entry_id(), 0x1234);
    assert_eq!(id.to_string(), "0x7f011234");
}

#[test]
fn spec_name_replaces_quotes_for_display() {
    let spec = ResSpec::new(
        ResId::new(0x7f, 1, 0),
        "say_\"hi\"".to_owned(),
        SpecOrigin::Decoded,
    );
    assert_eq!(spec.name(), "say_qhiq");
}

#[test]
fn duplicate_config_is_rejected_without_overwrite() {
    let mut spec = ResSpec::new(ResId::new(0x7f, 1, 0), "a".to_owned(), SpecOrigin::Decoded);
    spec.add_resource(string_resource("one"), false).unwrap();

    match spec.add_resource(string_resource("two"), false) {
        Err(Error::DuplicateResource { .. }) => {}
        other => panic!("expected DuplicateResource, got {other:?}"),
    }
    // Still the first value.
    assert_eq!(
        spec.default_resource().unwrap().value,
        Value::String("one".to_owned())
    );

    spec.add_resource(string_resource("two"), true).unwrap();
    assert_eq!(
        spec.default_resource().unwrap().value,
        Value::String("two".to_owned())
    );
}

#[test]
fn configured_resources_preserve_insertion_order() {
    let mut spec = ResSpec::new(ResId::new(0x7f, 1, 0), "a".to_owned(), SpecOrigin::Decoded);
    spec.add_resource(string_resource("default"), false).unwrap();
    spec.add_resource(
        ResResource {
            config: fr(),
            value: Value::String("fr".to_owned()),
        },
        false,
    )
    .unwrap();

    let configs: Vec<_> = spec.resources().iter().map(|r| r.config.clone()).collect();
    assert_eq!(configs, vec![ConfigFlags::default(), fr()]);
    assert!(spec.resource(&fr()).is_some());
}

#[test]
fn type_spec_flag_merging() {
    let mut ts = ResTypeSpec::new(1, "string".to_owned(), vec![0x1, 0x2]);
    ts.merge_flags(&[0x4, 0x4, 0x4]);
    assert_eq!(ts.flags(), &[0x5, 0x6, 0x4]);
    assert_eq!(ts.entry_count(), 3);
}

#[test]
fn values_files_group_by_type_and_config() {
    let mut pkg = ResPackage::new(0x7f, "com.example".to_owned());
    let ts = pkg.add_type_spec(ResTypeSpec::new(1, "string".to_owned(), vec![0, 0]));

    let mut a = ResSpec::new(ResId::new(0x7f, 1, 0), "a".to_owned(), SpecOrigin::Decoded);
    a.add_resource(string_resource("one"), false).unwrap();
    a.add_resource(
        ResResource {
            config: fr(),
            value: Value::String("un".to_owned()),
        },
        false,
    )
    .unwrap();
    ts.add_spec(a);

    let mut b = ResSpec::new(ResId::new(0x7f, 1, 1), "b".to_owned(), SpecOrigin::Decoded);
    b.add_resource(string_resource("two"), false).unwrap();
    ts.add_spec(b);

    let files = pkg.values_files();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0].path(), "values/strings.xml");
    assert_eq!(files[0].entries, vec![ResId::new(0x7f, 1, 0), ResId::new(0x7f, 1, 1)]);
    assert_eq!(files[1].path(), "values-fr/strings.xml");
    assert_eq!(files[1].entries, vec![ResId::new(0x7f, 1, 0)]);
}

#[test]
fn plural_bucket_name_is_not_doubled() {
    let mut pkg = ResPackage::new(0x7f, "com.example".to_owned());
    let ts = pkg.add_type_spec(ResTypeSpec::new(2, "plurals".to_owned(), vec![0]));
    let mut spec = ResSpec::new(ResId::new(0x7f, 2, 0), "p".to_owned(), SpecOrigin::Decoded);
    spec.add_resource(string_resource("x"), false).unwrap();
    ts.add_spec(spec);

    assert_eq!(pkg.values_files()[0].path(), "values/plurals.xml");
}

#[test]
fn file_references_are_not_values() {
    let mut pkg = ResPackage::new(0x7f, "com.example".to_owned());
    let ts = pkg.add_type_spec(ResTypeSpec::new(3, "drawable".to_owned(), vec![0]));
    let mut spec = ResSpec::new(ResId::new(0x7f, 3, 0), "icon".to_owned(), SpecOrigin::Decoded);
    spec.add_resource(
        ResResource {
            config: ConfigFlags::default(),
            value: Value::FileRef("res/drawable/icon.png".to_owned()),
        },
        false,
    )
    .unwrap();
    ts.add_spec(spec);

    assert!(pkg.values_files().is_empty());
    let files = pkg.file_resources();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].2, "res/drawable/icon.png");
}

#[test]
fn table_package_management() {
    let mut table = ResTable::new();
    table
        .add_package(ResPackage::new(0x01, "android".to_owned()), false)
        .unwrap();
    table
        .add_package(ResPackage::new(0x7f, "com.example".to_owned()), true)
        .unwrap();

    assert!(table
        .add_package(ResPackage::new(0x7f, "dup".to_owned()), false)
        .is_err());

    assert_eq!(table.packages().len(), 2);
    assert_eq!(table.package_by_id(0x01).unwrap().name, "android");
    assert_eq!(table.package_by_name("com.example").unwrap().id, 0x7f);

    let main = table.list_main_packages();
    assert_eq!(main.len(), 1);
    assert_eq!(main[0].name, "com.example");
}

#[test]
fn current_package_slot() {
    let mut table = ResTable::new();
    table
        .add_package(ResPackage::new(0x7f, "com.example".to_owned()), true)
        .unwrap();

    assert!(table.set_current_package(0x42).is_err());
    table.set_current_package(0x7f).unwrap();
    assert_eq!(table.current_package().unwrap().name, "com.example");
}

#[test]
fn spec_lookup_by_id() {
    let mut table = ResTable::new();
    let mut pkg = ResPackage::new(0x7f, "com.example".to_owned());
    let ts = pkg.add_type_spec(ResTypeSpec::new(1, "string".to_owned(), vec![0]));
    let mut spec = ResSpec::new(ResId::new(0x7f, 1, 0), "a".to_owned(), SpecOrigin::Decoded);
    spec.add_resource(string_resource("x"), false).unwrap();
    ts.add_spec(spec);
    table.add_package(pkg, true).unwrap();

    assert_eq!(table.spec(ResId::new(0x7f, 1, 0)).unwrap().name(), "a");
    match table.spec(ResId::new(0x7f, 1, 9)) {
        Err(Error::UnknownResourceId { id }) => assert_eq!(id, ResId::new(0x7f, 1, 9)),
        other => panic!("expected UnknownResourceId, got {other:?}"),
    }
}
