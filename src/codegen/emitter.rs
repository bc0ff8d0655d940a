//! Go emitter: declarations and statements.

use std::collections::BTreeSet;

use super::names::{self, TypeRenderer};
use crate::config::{CompilerConfig, Dialect};
use crate::error::PigeonResult;
use crate::lexer::Operator;
use crate::runtime;
use crate::semantic::{Interface, Struct, Variable};
use crate::types::type_def::DataType;
use crate::types::typed::*;

/// Emitted program text plus the lines a debugger may stop on
#[derive(Debug, Clone, PartialEq)]
pub struct EmittedPackage {
    pub code: String,
    /// Source lines of every emitted statement, ascending
    pub breakpoints: Vec<usize>,
}

/// A loop being emitted; its label is only written out when used
#[derive(Debug)]
struct LoopFrame {
    label: String,
    /// Byte offset in the output where the label belongs
    label_at: usize,
    indent: usize,
    /// Open switch/select statements between the loop and the current point
    nested_switches: usize,
    label_used: bool,
}

pub struct Emitter<'a> {
    pub(super) package: &'a CheckedPackage,
    pub(super) config: &'a CompilerConfig,
    pub(super) types: TypeRenderer,
    out: String,
    indent: usize,
    temp_counter: usize,
    loops: Vec<LoopFrame>,
    breakpoints: BTreeSet<usize>,
}

impl<'a> Emitter<'a> {
    pub fn new(package: &'a CheckedPackage, config: &'a CompilerConfig) -> Self {
        Self {
            package,
            config,
            types: TypeRenderer::new(&config.runtime_alias),
            out: String::new(),
            indent: 0,
            temp_counter: 0,
            loops: Vec::new(),
            breakpoints: BTreeSet::new(),
        }
    }

    /// Render the whole package
    pub fn emit(mut self) -> PigeonResult<EmittedPackage> {
        self.emit_header();

        for structure in self.package.structs.values() {
            self.emit_struct(structure);
        }
        for interface in self.package.interfaces.values() {
            self.emit_interface(interface);
        }
        for global in &self.package.globals {
            let value = self.expr(&global.value)?;
            self.line(&format!(
                "var {} {} = {}",
                names::global(&global.name),
                self.types.render(&global.data_type),
                value
            ));
            self.blank();
        }
        for function in &self.package.functions {
            let header = format!(
                "func {}{}",
                names::function(&function.name),
                self.signature(&function.params, &function.return_types)
            );
            self.emit_function(&header, function)?;
        }
        for method in &self.package.methods {
            let header = format!(
                "func ({} {}) {}{}",
                names::local(&method.receiver.name),
                self.types.render(&method.receiver.data_type),
                names::method(&method.function.name),
                self.signature(&method.function.params, &method.function.return_types)
            );
            self.emit_function(&header, &method.function)?;
        }

        if let Some(entry) = &self.package.entry {
            self.open("func main()");
            self.line(&format!("{}()", names::function(entry)));
            self.close();
            self.blank();
        }

        let breakpoints: Vec<usize> = self.breakpoints.iter().copied().collect();
        if self.config.emit_breakpoint_table {
            let lines: Vec<String> = breakpoints.iter().map(|l| l.to_string()).collect();
            self.line(&format!("var _breakpoints = []int{{{}}}", lines.join(", ")));
        }

        tracing::debug!(
            bytes = self.out.len(),
            breakpoints = breakpoints.len(),
            "emitted package"
        );

        Ok(EmittedPackage {
            code: self.out,
            breakpoints,
        })
    }

    fn emit_header(&mut self) {
        self.line("// Code generated by pigeon. DO NOT EDIT.");
        self.line(&format!("package {}", self.config.package_name));
        self.blank();

        self.open_group("import (");
        self.line("\"fmt\"");
        self.line(&format!(
            "{} \"{}\"",
            self.config.runtime_alias, self.config.runtime_import
        ));
        for import in self.package.imports.iter().filter(|i| i.native) {
            self.line(&format!("{} \"{}\"", import.name, import.path));
        }
        self.close_group(")");
        self.blank();

        self.line("var _ = fmt.Println");
        self.line(&format!(
            "var _ = {}.{}",
            self.config.runtime_alias,
            runtime::NO_OP
        ));
        self.blank();
    }

    fn emit_struct(&mut self, structure: &Struct) {
        self.open(&format!("type {} struct", structure.name));
        for member in &structure.members {
            self.line(&format!(
                "{} {}",
                names::field(&member.name),
                self.types.render(&member.data_type)
            ));
        }
        if let Some(code) = &structure.native_code {
            self.verbatim(code);
        }
        self.close();
        self.blank();
    }

    fn emit_interface(&mut self, interface: &Interface) {
        self.open(&format!("type {} interface", interface.name));
        for (name, signature) in &interface.methods {
            self.line(&format!(
                "{}{}",
                names::method(name),
                self.types.signature(signature)
            ));
        }
        self.close();
        self.blank();
    }

    fn emit_function(&mut self, header: &str, function: &CheckedFunction) -> PigeonResult<()> {
        self.open(header);
        match &function.native_code {
            Some(code) => self.verbatim(code),
            None => self.block(&function.body)?,
        }
        self.close();
        self.blank();
        Ok(())
    }

    /// `(_a int64, _b string) R`
    fn signature(&self, params: &[Variable], return_types: &[DataType]) -> String {
        let params: Vec<String> = params
            .iter()
            .map(|p| format!("{} {}", names::local(&p.name), self.types.render(&p.data_type)))
            .collect();
        format!("({}){}", params.join(", "), self.types.results(return_types))
    }

    // ===== Statements =====

    fn block(&mut self, body: &[TypedStmt]) -> PigeonResult<()> {
        for stmt in body {
            self.stmt(stmt)?;
        }
        Ok(())
    }

    fn stmt(&mut self, stmt: &TypedStmt) -> PigeonResult<()> {
        self.breakpoints.insert(stmt.location.line);

        match &stmt.kind {
            StmtKind::Locals(vars) => {
                for var in vars {
                    let declaration = match self.zero_value(&var.data_type) {
                        Some(init) => format!(
                            "var {} {} = {}",
                            names::local(&var.name),
                            self.types.render(&var.data_type),
                            init
                        ),
                        None => format!(
                            "var {} {}",
                            names::local(&var.name),
                            self.types.render(&var.data_type)
                        ),
                    };
                    self.line(&declaration);
                }
                let all: Vec<&Variable> = vars.iter().collect();
                self.mark_used(&all);
            }

            StmtKind::LocalFunc(function) => {
                let name = names::local(&function.name);
                let signature = self.signature(&function.params, &function.return_types);
                let function_type = DataType::Function(crate::types::FunctionType::new(
                    function.params.iter().map(|p| p.data_type.clone()).collect(),
                    function.return_types.clone(),
                ));
                self.line(&format!("var {} {}", name, self.types.render(&function_type)));

                // loops outside the closure are not reachable from inside it
                let outer_loops = std::mem::take(&mut self.loops);
                self.open(&format!("{} = func{}", name, signature));
                let result = self.block(&function.body);
                self.close();
                self.loops = outer_loops;
                result?;

                self.line(&format!("{}({})", self.rt(runtime::NO_OP), name));
            }

            StmtKind::If {
                condition,
                body,
                elseifs,
                else_body,
            } => {
                let condition = self.condition(condition)?;
                self.open(&format!("if {}", condition));
                self.block(body)?;
                for (condition, body) in elseifs {
                    let condition = self.condition(condition)?;
                    self.reopen(&format!("}} else if {}", condition));
                    self.block(body)?;
                }
                if let Some(body) = else_body {
                    self.reopen("} else");
                    self.block(body)?;
                }
                self.close();
            }

            StmtKind::While { condition, body } => {
                let condition = self.condition(condition)?;
                self.emit_loop(&format!("for {}", condition), |e| e.block(body))?;
            }

            StmtKind::Foreach {
                index,
                value,
                collection,
                body,
            } => self.emit_foreach(index, value, collection, body)?,

            StmtKind::Forinc {
                var,
                start,
                end,
                descending,
                body,
            } => {
                let name = names::local(&var.name);
                let start = self.expr(start)?;
                let end = self.expr(end)?;
                let header = if self.is_dynamic() {
                    let (test, step) = if *descending {
                        (Operator::Gt, Operator::Dec)
                    } else {
                        (Operator::Lt, Operator::Inc)
                    };
                    format!(
                        "for {n} := interface{{}}({s}); {t}({c}({n}, {e})); {n} = {c2}({n})",
                        n = name,
                        s = start,
                        e = end,
                        t = self.rt(runtime::TRUTHY),
                        c = self.rt(&runtime::dynamic_helper(test)),
                        c2 = self.rt(&runtime::dynamic_helper(step)),
                    )
                } else if *descending {
                    format!("for {n} := {s}; {n} > {e}; {n}--", n = name, s = start, e = end)
                } else {
                    format!("for {n} := {s}; {n} < {e}; {n}++", n = name, s = start, e = end)
                };
                self.emit_loop(&header, |e| e.block(body))?;
            }

            StmtKind::Typeswitch {
                subject,
                cases,
                default,
            } => {
                let subject = self.expr(subject)?;
                let bound = if cases.is_empty() {
                    None
                } else {
                    Some(self.fresh("ts"))
                };
                let header = match &bound {
                    Some(temp) => format!("switch {} := {}.(type)", temp, subject),
                    None => format!("switch {}.(type)", subject),
                };
                self.open(&header);
                self.enter_switch();
                let result = self.emit_type_cases(bound.as_deref(), cases, default.as_deref());
                self.leave_switch();
                result?;
                self.close();
            }

            StmtKind::Select { clauses, default } => {
                self.open("select");
                self.enter_switch();
                let result = self.emit_select_clauses(clauses, default.as_deref());
                self.leave_switch();
                result?;
                self.close();
            }

            StmtKind::Assignment { targets, value } => self.emit_assignment(targets, value)?,

            StmtKind::Return(values) => self.emit_return(values)?,

            StmtKind::Break => {
                let labelled = match self.loops.last_mut() {
                    Some(frame) if frame.nested_switches > 0 => {
                        frame.label_used = true;
                        Some(frame.label.clone())
                    }
                    _ => None,
                };
                match labelled {
                    Some(label) => self.line(&format!("break {}", label)),
                    None => self.line("break"),
                }
            }

            StmtKind::Continue => self.line("continue"),

            StmtKind::Go(call) => {
                let call = self.expr(call)?;
                self.line(&format!("go {}", call));
            }

            StmtKind::Expression(expr) => {
                let rendered = self.statement_expr(expr)?;
                self.line(&rendered);
            }
        }
        Ok(())
    }

    fn emit_type_cases(
        &mut self,
        bound: Option<&str>,
        cases: &[(Variable, Vec<TypedStmt>)],
        default: Option<&[TypedStmt]>,
    ) -> PigeonResult<()> {
        for (binding, body) in cases {
            self.case_line(&format!("case {}:", self.types.render(&binding.data_type)));
            if let Some(temp) = bound {
                self.line(&format!("{} := {}", names::local(&binding.name), temp));
                self.mark_used(&[binding]);
            }
            self.block(body)?;
        }
        if let Some(body) = default {
            self.case_line("default:");
            self.block(body)?;
        }
        Ok(())
    }

    fn emit_select_clauses(
        &mut self,
        clauses: &[TypedSelectClause],
        default: Option<&[TypedStmt]>,
    ) -> PigeonResult<()> {
        for clause in clauses {
            match clause {
                TypedSelectClause::Sending {
                    channel,
                    value,
                    body,
                } => {
                    let channel = self.expr(channel)?;
                    let value = self.expr(value)?;
                    self.case_line(&format!("case {} <- {}:", channel, value));
                    self.block(body)?;
                }
                TypedSelectClause::Rcving {
                    binding,
                    channel,
                    body,
                } => {
                    let channel = self.expr(channel)?;
                    self.case_line(&format!(
                        "case {} := <-{}:",
                        names::local(&binding.name),
                        channel
                    ));
                    self.mark_used(&[binding]);
                    self.block(body)?;
                }
            }
        }
        if let Some(body) = default {
            self.case_line("default:");
            self.block(body)?;
        }
        Ok(())
    }

    fn emit_foreach(
        &mut self,
        index: &Variable,
        value: &Variable,
        collection: &TypedExpr,
        body: &[TypedStmt],
    ) -> PigeonResult<()> {
        let collection_code = self.expr(collection)?;
        let index_name = names::local(&index.name);
        let value_name = names::local(&value.name);
        let index_type = self.types.render(&index.data_type);
        let value_type = self.types.render(&value.data_type);

        if self.is_dynamic() {
            let entry = self.fresh("e");
            let header = format!(
                "for _, {} := range {}({})",
                entry,
                self.rt(runtime::ENTRIES),
                collection_code
            );
            return self.emit_loop(&header, |e| {
                e.line(&format!("var {} {} = {}.Key", index_name, index_type, entry));
                e.line(&format!("var {} {} = {}.Value", value_name, value_type, entry));
                e.mark_used(&[index, value]);
                e.block(body)
            });
        }

        match collection.data_type() {
            DataType::List(_) => {
                let list = self.fresh("c");
                let i = self.fresh("i");
                self.line(&format!("{} := {}", list, collection_code));
                let header = format!(
                    "for {i} := int64(0); {i} < {l}.{len}(); {i}++",
                    i = i,
                    l = list,
                    len = runtime::list::LEN
                );
                self.emit_loop(&header, |e| {
                    e.line(&format!("var {} {} = {}({})", index_name, index_type, index_type, i));
                    e.line(&format!(
                        "var {} {} = {}.{}({})",
                        value_name,
                        value_type,
                        list,
                        runtime::list::GET,
                        i
                    ));
                    e.mark_used(&[index, value]);
                    e.block(body)
                })
            }
            DataType::Map(..) => {
                let k = self.fresh("k");
                let v = self.fresh("v");
                let header = format!("for {}, {} := range {}", k, v, collection_code);
                self.emit_loop(&header, |e| {
                    e.line(&format!("var {} {} = {}", index_name, index_type, k));
                    e.line(&format!("var {} {} = {}", value_name, value_type, v));
                    e.mark_used(&[index, value]);
                    e.block(body)
                })
            }
            _ => {
                let i = self.fresh("i");
                let v = self.fresh("v");
                let header = format!("for {}, {} := range {}", i, v, collection_code);
                self.emit_loop(&header, |e| {
                    e.line(&format!("var {} {} = {}({})", index_name, index_type, index_type, i));
                    e.line(&format!("var {} {} = {}", value_name, value_type, v));
                    e.mark_used(&[index, value]);
                    e.block(body)
                })
            }
        }
    }

    fn emit_assignment(&mut self, targets: &[AssignTarget], value: &TypedExpr) -> PigeonResult<()> {
        let value_code = self.expr(value)?;

        if let [target] = targets {
            let line = self.assign_to(target, &value_code)?;
            self.line(&line);
            return Ok(());
        }

        if targets.iter().all(|t| !self.needs_setter(t)) {
            let lhs = targets
                .iter()
                .map(|t| self.target_place(t))
                .collect::<PigeonResult<Vec<_>>>()?;
            self.line(&format!("{} = {}", lhs.join(", "), value_code));
            return Ok(());
        }

        // list elements are written through a method call, so stage the values
        let temps: Vec<String> = targets.iter().map(|_| self.fresh("a")).collect();
        self.line(&format!("{} := {}", temps.join(", "), value_code));
        for (target, temp) in targets.iter().zip(&temps) {
            let line = self.assign_to(target, temp)?;
            self.line(&line);
        }
        Ok(())
    }

    fn emit_return(&mut self, values: &[TypedExpr]) -> PigeonResult<()> {
        if let [single] = values {
            let is_assertion = matches!(
                single.kind,
                ExprKind::Operation {
                    operator: Operator::IsType,
                    ..
                }
            );
            if is_assertion {
                // a comma-ok assertion only yields two values in an assignment
                let value = self.expr(single)?;
                let temps = [self.fresh("r"), self.fresh("r")];
                self.line(&format!("{} := {}", temps.join(", "), value));
                self.line(&format!("return {}", temps.join(", ")));
                return Ok(());
            }
        }

        let rendered = values
            .iter()
            .map(|v| self.expr(v))
            .collect::<PigeonResult<Vec<_>>>()?;
        if rendered.is_empty() {
            self.line("return");
        } else {
            self.line(&format!("return {}", rendered.join(", ")));
        }
        Ok(())
    }

    /// Emit a loop whose body may need a label for `break`
    fn emit_loop<F>(&mut self, header: &str, body: F) -> PigeonResult<()>
    where
        F: FnOnce(&mut Self) -> PigeonResult<()>,
    {
        let label = self.fresh("loop");
        self.loops.push(LoopFrame {
            label,
            label_at: self.out.len(),
            indent: self.indent,
            nested_switches: 0,
            label_used: false,
        });

        self.open(header);
        let result = body(self);
        self.close();

        if let Some(frame) = self.loops.pop() {
            if frame.label_used {
                let label_line = format!("{}{}:\n", "\t".repeat(frame.indent), frame.label);
                self.out.insert_str(frame.label_at, &label_line);
            }
        }
        result
    }

    fn enter_switch(&mut self) {
        if let Some(frame) = self.loops.last_mut() {
            frame.nested_switches += 1;
        }
    }

    fn leave_switch(&mut self) {
        if let Some(frame) = self.loops.last_mut() {
            frame.nested_switches = frame.nested_switches.saturating_sub(1);
        }
    }

    /// Initial value for a freshly declared local, if it is not Go's zero value
    fn zero_value(&self, data_type: &DataType) -> Option<String> {
        match data_type {
            DataType::List(_) | DataType::Map(..) => {
                Some(format!("{}{{}}", self.composite_type(data_type)))
            }
            DataType::Channel(_) => Some(format!("make({})", self.types.render(data_type))),
            _ => None,
        }
    }

    fn mark_used(&mut self, vars: &[&Variable]) {
        if vars.is_empty() {
            return;
        }
        let names: Vec<String> = vars.iter().map(|v| names::local(&v.name)).collect();
        self.line(&format!("{}({})", self.rt(runtime::NO_OP), names.join(", ")));
    }

    // ===== Output helpers =====

    pub(super) fn is_dynamic(&self) -> bool {
        self.config.dialect == Dialect::Dynamic
    }

    /// Qualified runtime symbol
    pub(super) fn rt(&self, symbol: &str) -> String {
        format!("{}.{}", self.config.runtime_alias, symbol)
    }

    pub(super) fn fresh(&mut self, prefix: &str) -> String {
        self.temp_counter += 1;
        names::temp(prefix, self.temp_counter)
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push('\t');
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    /// `case`/`default` labels sit at the level of their switch
    fn case_line(&mut self, text: &str) {
        self.indent = self.indent.saturating_sub(1);
        self.line(text);
        self.indent += 1;
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn verbatim(&mut self, code: &str) {
        for line in code.lines() {
            self.out.push_str(line);
            self.out.push('\n');
        }
    }

    fn open(&mut self, header: &str) {
        self.line(&format!("{} {{", header));
        self.indent += 1;
    }

    /// Close a block and open the next one on the same line
    fn reopen(&mut self, header: &str) {
        self.indent = self.indent.saturating_sub(1);
        self.line(&format!("{} {{", header));
        self.indent += 1;
    }

    fn close(&mut self) {
        self.indent = self.indent.saturating_sub(1);
        self.line("}");
    }

    fn open_group(&mut self, header: &str) {
        self.line(header);
        self.indent += 1;
    }

    fn close_group(&mut self, footer: &str) {
        self.indent = self.indent.saturating_sub(1);
        self.line(footer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;
    use crate::semantic;
    use crate::types::TypeChecker;
    use pretty_assertions::assert_eq;

    fn emit_with(source: &str, config: &CompilerConfig) -> EmittedPackage {
        let tokens = Lexer::new(source, None).tokenize().unwrap();
        let parsed = Parser::new(tokens).parse().unwrap();
        let package = semantic::build(parsed, config).unwrap();
        let checked = TypeChecker::new(&package, config).check().unwrap();
        Emitter::new(&checked, config).emit().unwrap()
    }

    fn emit(source: &str) -> String {
        emit_with(source, &CompilerConfig::new()).code
    }

    #[test]
    fn test_hello_program() {
        let expected = "\
// Code generated by pigeon. DO NOT EDIT.
package main

import (
\t\"fmt\"
\trt \"pigeon/stdlib\"
)

var _ = fmt.Println
var _ = rt.NoOp

func F_main() {
\tfmt.Println(\"hi\")
}

func main() {
\tF_main()
}

var _breakpoints = []int{2}
";
        assert_eq!(emit("func main\n    (println \"hi\")\n"), expected);
    }

    #[test]
    fn test_declarations() {
        let source = "\
interface Animal
    speak : Str
struct Dog
    name Str
    age I
method speak d Dog : Str
    return \"woof\"
global limit I 10
func main
    (println limit)
";
        let code = emit(source);
        assert!(code.contains("type Dog struct {\n\tName string\n\tAge int64\n}\n"));
        assert!(code.contains("type Animal interface {\n\tM_speak() string\n}\n"));
        assert!(code.contains("func (_d Dog) M_speak() string {\n\treturn \"woof\"\n}\n"));
        assert!(code.contains("var G_limit int64 = int64(10)\n"));
    }

    #[test]
    fn test_locals_are_initialized_and_marked_used() {
        let code = emit("func main\n    locals xs L<I> m M<Str I> ch Ch<F> n I\n    (push xs 1)\n");
        assert!(code.contains(
            "\tvar _xs *rt.List[int64] = &rt.List[int64]{}\n\
             \tvar _m map[string]int64 = map[string]int64{}\n\
             \tvar _ch chan float64 = make(chan float64)\n\
             \tvar _n int64\n\
             \trt.NoOp(_xs, _m, _ch, _n)\n\
             \t_xs.Append(int64(1))\n"
        ));
    }

    #[test]
    fn test_loops() {
        let source = "\
func main
    locals xs L<I> ys S<Str>
    foreach i I v I xs
        (println v)
    foreach j I s Str ys
        (println s)
    forinc k I 0 3
        (println k)
    fordec k I 3 0
        continue
";
        let code = emit(source);
        assert!(code.contains(
            "\t__c1 := _xs\n\
             \tfor __i2 := int64(0); __i2 < __c1.Len(); __i2++ {\n\
             \t\tvar _i int64 = int64(__i2)\n\
             \t\tvar _v int64 = __c1.Get(__i2)\n\
             \t\trt.NoOp(_i, _v)\n"
        ));
        assert!(code.contains("\tfor __i4, __v5 := range _ys {\n\t\tvar _j int64 = int64(__i4)\n"));
        assert!(code.contains("\tfor _k := int64(0); _k < int64(3); _k++ {\n"));
        assert!(code.contains("\tfor _k := int64(3); _k > int64(0); _k-- {\n\t\tcontinue\n"));
        assert!(!code.contains("__loop"));
    }

    #[test]
    fn test_break_inside_select_uses_label() {
        let source = "\
func main
    locals ch Ch<I> done Bool
    while (not done)
        select
            rcving v I ch
                break
            default
                as done true
";
        let code = emit(source);
        assert!(code.contains(
            "\t__loop1:\n\
             \tfor (!_done) {\n\
             \t\tselect {\n\
             \t\tcase _v := <-_ch:\n\
             \t\t\trt.NoOp(_v)\n\
             \t\t\tbreak __loop1\n\
             \t\tdefault:\n\
             \t\t\t_done = true\n\
             \t\t}\n\
             \t}\n"
        ));
    }

    #[test]
    fn test_typeswitch() {
        let source = "\
interface Animal
    speak : Str
struct Dog
    name Str
method speak d Dog : Str
    return \"woof\"
func main
    locals a Animal
    as a (Dog \"Rex\")
    typeswitch a
        case d Dog
            (println (. d name) (.speak d))
        default
            (println \"?\")
";
        let code = emit(source);
        assert!(code.contains("\t_a = Dog{Name: \"Rex\"}\n"));
        assert!(code.contains(
            "\tswitch __ts1 := _a.(type) {\n\
             \tcase Dog:\n\
             \t\t_d := __ts1\n\
             \t\trt.NoOp(_d)\n\
             \t\tfmt.Println(_d.Name, _d.M_speak())\n\
             \tdefault:\n\
             \t\tfmt.Println(\"?\")\n\
             \t}\n"
        ));
    }

    #[test]
    fn test_assignments() {
        let source = "\
func pair : I Str
    return 1 \"a\"
func main
    locals xs L<I> m M<Str I> n I s Str
    as xs[0] 5
    as (get m \"k\") 2
    as n s (pair)
    as xs[1] s (pair)
";
        let code = emit(source);
        assert!(code.contains("\t_xs.Set(int64(0), int64(5))\n"));
        assert!(code.contains("\t_m[\"k\"] = int64(2)\n"));
        assert!(code.contains("\t_n, _s = F_pair()\n"));
        assert!(code.contains("\t__a1, __a2 := F_pair()\n\t_xs.Set(int64(1), __a1)\n\t_s = __a2\n"));
    }

    #[test]
    fn test_local_func() {
        let source = "\
func main
    localfunc twice n I : I
        return (mul n 2)
    (println (twice 4))
";
        let code = emit(source);
        assert!(code.contains(
            "\tvar _twice func(int64) int64\n\
             \t_twice = func(_n int64) int64 {\n\
             \t\treturn (_n * int64(2))\n\
             \t}\n\
             \trt.NoOp(_twice)\n\
             \tfmt.Println(_twice(int64(4)))\n"
        ));
    }

    #[test]
    fn test_breakpoints_and_stability() {
        let source = "func main\n    (println 1)\n\n    if true\n        (println 2)\n";
        let first = emit_with(source, &CompilerConfig::new());
        let second = emit_with(source, &CompilerConfig::new());
        assert_eq!(first, second);
        assert_eq!(first.breakpoints, vec![2, 4, 5]);
        assert!(first.code.ends_with("var _breakpoints = []int{2, 4, 5}\n"));
    }

    #[test]
    fn test_library_has_no_entry_point() {
        let code = emit_with("func helper\n    (println 1)\n", &CompilerConfig::library()).code;
        assert!(!code.contains("func main()"));
        assert!(code.contains("func F_helper() {"));
    }

    #[test]
    fn test_dynamic_dialect() {
        let source = "\
func main
    locals x I xs L<I>
    as xs (L<I> 1 2)
    foreach i I v I xs
        as x (add x v)
    if (gt x 2)
        (println x)
";
        let code = emit_with(source, &CompilerConfig::dynamic()).code;
        assert!(code.contains("\tvar _x interface{}\n\tvar _xs interface{}\n"));
        assert!(code.contains("\t_xs = rt.NewList(int64(1), int64(2))\n"));
        assert!(code.contains("\tfor _, __e1 := range rt.Entries(_xs) {\n\t\tvar _i interface{} = __e1.Key\n"));
        assert!(code.contains("\t\t_x = rt.Add(_x, _v)\n"));
        assert!(code.contains("\tif rt.Truthy(rt.Gt(_x, int64(2))) {\n"));
    }
}
