use gqlscan_core::config::AutoGenerate;
use gqlscan_core::{
    generate_schema, parse_go_source, render_document, AutoGenerateStrategy, BlockKind,
    NoExternalLoader, SchemaBlock, Settings,
};
use pretty_assertions::assert_eq;

fn run(files: &[(&str, &str)], settings: &Settings) -> Vec<SchemaBlock> {
    let units = files
        .iter()
        .map(|(path, code)| parse_go_source(path, code).unwrap())
        .collect();
    generate_schema(units, &NoExternalLoader, settings).unwrap()
}

fn block<'a>(blocks: &'a [SchemaBlock], name: &str) -> &'a SchemaBlock {
    blocks
        .iter()
        .find(|b| b.name == name)
        .unwrap_or_else(|| panic!("no block named {name}"))
}

fn names(blocks: &[SchemaBlock]) -> Vec<&str> {
    blocks.iter().map(|b| b.name.as_str()).collect()
}

#[test]
fn include_list_limits_field_to_named_variant() {
    let blocks = run(
        &[(
            "app/users/user.go",
            r#"package users

// @gqlType(name:"UserV1")
// @gqlType(name:"UserV2")
type User struct {
	Name   string
	Secret string `gql:"secret,include:UserV2"`
}
"#,
        )],
        &Settings::default(),
    );
    assert_eq!(names(&blocks), vec!["UserV1", "UserV2"]);
    assert_eq!(block(&blocks, "UserV1").text, "type UserV1 {\n  name: String!\n}\n");
    assert_eq!(
        block(&blocks, "UserV2").text,
        "type UserV2 {\n  name: String!\n  secret: String!\n}\n"
    );
}

#[test]
fn read_only_list_restricts_to_listed_type() {
    let blocks = run(
        &[(
            "app/staff/staff.go",
            r#"package staff

// @gqlType(name:"AdminView")
// @gqlType(name:"UserView")
// @gqlInput(name:"UserInput")
type Employee struct {
	Name   string
	Salary int `gql:"salary,ro:AdminView"`
}
"#,
        )],
        &Settings::default(),
    );
    assert!(block(&blocks, "AdminView").text.contains("salary: Int!"));
    assert!(!block(&blocks, "UserView").text.contains("salary"));
    assert!(!block(&blocks, "UserInput").text.contains("salary"));
    assert_eq!(block(&blocks, "UserInput").kind, BlockKind::Input);
}

#[test]
fn enum_values_come_from_constants_in_another_file() {
    let blocks = run(
        &[
            (
                "app/orders/status.go",
                "package orders\n\n// @gqlEnum\ntype Status string\n",
            ),
            (
                "app/orders/values.go",
                r#"package orders

const (
	StatusPending Status = "PENDING"
	StatusActive  Status = "ACTIVE"
)
"#,
            ),
        ],
        &Settings::default(),
    );
    assert_eq!(
        block(&blocks, "Status").text,
        "enum Status {\n  PENDING\n  ACTIVE\n}\n"
    );
}

#[test]
fn generic_embedding_substitutes_arguments() {
    let blocks = run(
        &[(
            "app/users/wrap.go",
            r#"package users

type Wrapper[T any] struct {
	Data  T
	Count int
}

type User struct {
	ID string
}

// @gqlType
type UserWrapper struct {
	Wrapper[*User]
}
"#,
        )],
        &Settings::default(),
    );
    assert_eq!(names(&blocks), vec!["UserWrapper"]);
    assert_eq!(
        blocks[0].text,
        "type UserWrapper {\n  data: User!\n  count: Int!\n}\n"
    );
}

#[test]
fn reachable_generation_stops_at_max_depth() {
    let settings = Settings {
        auto_generate: AutoGenerate {
            strategy: AutoGenerateStrategy::Reachable,
            max_depth: 1,
            ..AutoGenerate::default()
        },
        ..Settings::default()
    };
    let blocks = run(
        &[(
            "app/tree/tree.go",
            r#"package tree

// @gqlType
type Root struct {
	First Level1
}

type Level1 struct {
	Next Level2
}

type Level2 struct {
	Next Level3
}

type Level3 struct {
	Leaf int
}
"#,
        )],
        &settings,
    );
    assert_eq!(names(&blocks), vec!["Root", "Level1"]);
    assert!(blocks.iter().all(|b| b.kind == BlockKind::Type));
}

#[test]
fn wildcard_read_only_beats_omit_and_write_only_is_its_inverse() {
    let blocks = run(
        &[(
            "app/items/item.go",
            r#"package items

// @gqlType(name:"ItemA")
// @gqlType(name:"ItemB")
// @gqlInput(name:"ItemInputA")
// @gqlInput(name:"ItemInputB")
type Item struct {
	ID    string `gql:"id,ro,omit:ItemB"`
	Token string `gql:"token,wo,include:ItemInputA"`
}
"#,
        )],
        &Settings::default(),
    );
    for name in ["ItemA", "ItemB"] {
        let text = &block(&blocks, name).text;
        assert!(text.contains("id: String!"), "{name}");
        assert!(!text.contains("token"), "{name}");
    }
    for name in ["ItemInputA", "ItemInputB"] {
        let text = &block(&blocks, name).text;
        assert!(!text.contains("id:"), "{name}");
        assert!(text.contains("token: String!"), "{name}");
    }
}

#[test]
fn structs_without_directives_produce_nothing() {
    let blocks = run(
        &[(
            "app/plain/plain.go",
            r#"package plain

// Plain has a doc comment but no directive.
type Plain struct {
	Name string
}

type Kind string

const (
	KindA Kind = "A"
)
"#,
        )],
        &Settings::default(),
    );
    assert!(blocks.is_empty());
}

#[test]
fn generation_is_byte_identical_across_runs() {
    let files = [
        (
            "app/shop/shop.go",
            r#"package shop

// @gqlEnum
type Level int

const (
	LevelLow Level = iota
	LevelHigh
)

type Page[T any] struct {
	Items []T
	Next  *string
}

// Product on sale.
// @gqlType
// @gqlInput
type Product struct {
	Name    string
	Level   Level
	Related Page[*Product] `gql:"related,ro"`
}
"#,
        ),
    ];
    let settings = Settings {
        gqlgen_directives: true,
        ..Settings::default()
    };
    let first = render_document(&run(&files, &settings));
    let second = render_document(&run(&files, &settings));
    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn enum_matching_ignores_scan_order() {
    let candidate = (
        "app/flags/flag.go",
        "package flags\n\n// @gqlEnum(description:\"Feature flag\")\ntype Flag int\n",
    );
    let constants = (
        "app/flags/values.go",
        r#"package flags

const (
	FlagOff Flag = iota
	FlagOn
	// @gqlEnumValue(name:"BETA")
	FlagExperimental
)
"#,
    );
    let settings = Settings::default();
    let forward = run(&[candidate, constants], &settings);
    let backward = run(&[constants, candidate], &settings);
    assert_eq!(block(&forward, "Flag").text, block(&backward, "Flag").text);
    assert_eq!(
        block(&forward, "Flag").text,
        "\"Feature flag\"\nenum Flag {\n  OFF\n  ON\n  BETA\n}\n"
    );
}

#[test]
fn nested_generic_chains_leave_no_type_parameters() {
    let blocks = run(
        &[(
            "app/deep/deep.go",
            r#"package deep

type Inner[U any] struct {
	Value U
	Items []U
}

type Middle[V any] struct {
	Inner[V]
	Label string
}

type Outer[T any] struct {
	Middle[T]
}

type User struct {
	ID string
}

// @gqlType
type Holder struct {
	Outer[*User]
}
"#,
        )],
        &Settings::default(),
    );
    assert_eq!(
        block(&blocks, "Holder").text,
        "type Holder {\n  value: User!\n  items: [User!]!\n  label: String!\n}\n"
    );
    for residue in [": T", ": U", ": V", "[T", "[U", "[V", "JSON"] {
        assert!(!blocks[0].text.contains(residue), "{residue}");
    }
}

#[test]
fn channel_fields_do_not_abort_generation() {
    let blocks = run(
        &[(
            "app/jobs/job.go",
            r#"package jobs

// @gqlType
type Job struct {
	Name string
	Done <-chan bool
}
"#,
        )],
        &Settings::default(),
    );
    assert_eq!(blocks[0].text, "type Job {\n  name: String!\n  done: JSON!\n}\n");
}

#[test]
fn untyped_constants_in_an_enum_block_are_not_values() {
    let blocks = run(
        &[(
            "app/tickets/status.go",
            r#"package tickets

// @gqlEnum
type Status string

const (
	StatusOpen Status = "open"
	MaxRetries = 3
)
"#,
        )],
        &Settings::default(),
    );
    assert_eq!(block(&blocks, "Status").text, "enum Status {\n  OPEN\n}\n");
}
