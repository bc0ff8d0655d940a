//! End-to-end compilation of small Pigeon programs

use pigeon::{check, compile, CompilerConfig, PigeonError};
use pretty_assertions::assert_eq;

const ANIMAL: &str = "interface Animal
    speak : Str
struct Dog
    name Str
";

fn go(source: &str) -> String {
    compile(source, Some("test.pg"), &CompilerConfig::new())
        .unwrap()
        .code
}

fn failure(source: &str, config: &CompilerConfig) -> (String, usize, usize) {
    let err: PigeonError = compile(source, None, config).unwrap_err();
    let location = err.location().cloned().unwrap();
    (err.message().to_string(), location.line, location.column)
}

#[test]
fn empty_argument_function() {
    let code = go("func main\n    (println \"hi\")\n");
    assert!(code.starts_with("// Code generated by pigeon. DO NOT EDIT.\npackage main\n"));
    assert!(code.contains("func F_main() {\n\tfmt.Println(\"hi\")\n}\n"));
    assert!(code.contains("func main() {\n\tF_main()\n}\n"));
}

#[test]
fn multi_return_and_typeswitch() {
    let source = format!(
        "{}method speak d Dog : Str
    return \"woof\"
func main
    locals a Animal
    as a (Dog \"Rex\")
    typeswitch a
        case d Dog
            (println (. d name) (.speak d))
",
        ANIMAL
    );

    let checked = check(&source, None, &CompilerConfig::new()).unwrap();
    assert!(checked.structs["Dog"].implements("Animal"));

    let code = go(&source);
    assert!(code.contains("type Dog struct {\n\tName string\n}\n"));
    assert!(code.contains("type Animal interface {\n\tM_speak() string\n}\n"));
    assert!(code.contains("func (_d Dog) M_speak() string {\n\treturn \"woof\"\n}\n"));
    assert!(code.contains("_a = Dog{Name: \"Rex\"}"));
    assert!(code.contains("case Dog:"));
    assert!(code.contains("fmt.Println(_d.Name, _d.M_speak())"));
}

#[test]
fn generic_containers() {
    let code = go("func main
    locals xs L<I>
    (push xs 1)
    (push xs 2)
    (println (len xs))
");
    assert!(code.contains("var _xs *rt.List[int64] = &rt.List[int64]{}"));
    assert!(code.contains("\t_xs.Append(int64(1))\n\t_xs.Append(int64(2))\n"));
    assert!(code.contains("fmt.Println(_xs.Len())"));
}

#[test]
fn interface_mismatch() {
    let source = format!(
        "{}method speak d Dog : I
    return 1
func main
    locals a Animal
    as a (Dog \"Rex\")
",
        ANIMAL
    );
    let package = {
        let tokens = pigeon::Lexer::new(&source, None).tokenize().unwrap();
        let parsed = pigeon::Parser::new(tokens).parse().unwrap();
        pigeon::semantic::build(parsed, &CompilerConfig::new()).unwrap()
    };
    assert!(!package.structs["Dog"].implements("Animal"));

    let (message, line, _) = failure(&source, &CompilerConfig::new());
    assert_eq!(message, "cannot assign Dog to Animal");
    assert_eq!(line, 9);
}

#[test]
fn recursive_struct_rejection() {
    let (message, _, _) = failure("struct Node\n    next Node\n", &CompilerConfig::new());
    assert_eq!(message, "Struct cannot recursively contain itself");

    let code = compile(
        "struct Node\n    next P<Node>\n",
        None,
        &CompilerConfig::library(),
    )
    .unwrap()
    .code;
    assert!(code.contains("type Node struct {\n\tNext *Node\n}\n"));
    assert!(!code.contains("func main()"));
}

#[test]
fn indentation_continued_literal() {
    let code = go("func main
    locals m M<Str I>
    as m (M<Str I> \"a\" 1
        , \"b\" 2)
    (println (get m \"b\"))
");
    assert!(code.contains("_m = map[string]int64{\"a\": int64(1), \"b\": int64(2)}"));
    assert!(code.contains("fmt.Println(_m[\"b\"])"));
}

#[test]
fn name_uniqueness_is_case_insensitive() {
    let (message, line, _) = failure(
        "func dog\n    return\nstruct Dog\n    name Str\nfunc main\n    return\n",
        &CompilerConfig::new(),
    );
    assert!(message.starts_with("duplicate definition of 'Dog'"), "{}", message);
    assert_eq!(line, 3);
}

#[test]
fn assignment_arity() {
    let prelude = "func pair : I Str\n    return 1 \"a\"\nfunc main\n    locals n I s Str\n";
    assert!(check(
        &format!("{}    as n s (pair)\n", prelude),
        None,
        &CompilerConfig::new()
    )
    .is_ok());

    let (message, line, _) = failure(&format!("{}    as n (pair)\n", prelude), &CompilerConfig::new());
    assert_eq!(message, "assignment to 1 target but the value yields (I, Str)");
    assert_eq!(line, 5);
}

#[test]
fn return_completeness() {
    let (message, _, _) = failure(
        "func f : I\n    (println 1)\nfunc main\n    (f)\n",
        &CompilerConfig::new(),
    );
    assert_eq!(message, "function 'f' must end with a return statement");
}

#[test]
fn emission_is_stable() {
    let source = format!(
        "{}method speak d Dog : Str
    return (concat \"w\" \"oof\")
func main
    locals xs L<I>
    foreach i I v I xs
        (println i v)
",
        ANIMAL
    );
    let first = compile(&source, None, &CompilerConfig::new()).unwrap();
    let second = compile(&source, None, &CompilerConfig::new()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn dynamic_dialect() {
    let code = compile(
        "func main\n    locals x I\n    as x (add 1 \"two\")\n    (println x)\n",
        None,
        &CompilerConfig::dynamic(),
    )
    .unwrap()
    .code;
    assert!(code.contains("var _x interface{}"));
    assert!(code.contains("_x = rt.Add(int64(1), \"two\")"));

    let (message, _, _) = failure(
        "func main\n    locals x I\n    as x (add 1)\n",
        &CompilerConfig::dynamic(),
    );
    assert_eq!(message, "add requires at least 2 operands, found 1");
}
