//! One-line-per-item summary of a parsed program, printed by `cinderc --ast`.

use std::fmt::Write as _;

use cinder_ast::nodes::{Module, Program, Stmt, StmtKind, Visibility};

/// Renders every module of `program` with its top-level items.
#[must_use]
pub fn outline(program: &Program<'_>) -> String {
    let mut out = String::new();
    for module in program.modules() {
        module_outline(&mut out, module);
    }
    out
}

fn module_outline(out: &mut String, module: &Module<'_>) {
    let _ = writeln!(out, "module {} ({})", module.name.name, module.path);
    for item in module.items {
        let _ = writeln!(out, "  {}", item_line(item));
    }
}

fn modifier(visibility: Option<Visibility>) -> &'static str {
    match visibility {
        Some(Visibility::Public) => "pub ",
        Some(Visibility::Private) => "priv ",
        None => "",
    }
}

fn item_line(item: &Stmt<'_>) -> String {
    match &item.kind {
        StmtKind::Use(directive) => match directive.alias {
            Some(alias) => format!("use {} as {}", directive.module.name, alias.name),
            None => format!("use {}", directive.module.name),
        },
        StmtKind::VarDecl(decl) => {
            let keyword = if decl.is_const { "const" } else { "let" };
            let mut line = format!("{}{keyword} {}", modifier(decl.visibility), decl.name.name);
            if let Some(ty) = decl.ty {
                let _ = write!(line, ": {ty}");
            }
            line
        }
        StmtKind::Function(function) => {
            let params = function
                .params
                .iter()
                .map(|param| match (param.name, param.ty) {
                    (Some(name), Some(ty)) => format!("{}: {ty}", name.name),
                    (Some(name), None) => name.name.to_string(),
                    (None, Some(ty)) => format!("_: {ty}"),
                    (None, None) => "_".to_string(),
                })
                .collect::<Vec<_>>()
                .join(", ");
            let mut line = format!(
                "{}fn {}({params})",
                modifier(function.visibility),
                function.name.name
            );
            if let Some(ret) = function.return_type {
                let _ = write!(line, " -> {ret}");
            }
            line
        }
        StmtKind::Struct(decl) => {
            let fields = decl
                .fields
                .iter()
                .map(|field| format!("{}: {}", field.name.name, field.ty))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{}struct {} {{ {fields} }}", modifier(decl.visibility), decl.name.name)
        }
        StmtKind::Enum(decl) => {
            let variants = decl
                .variants
                .iter()
                .map(|variant| variant.name)
                .collect::<Vec<_>>()
                .join(", ");
            format!("{}enum {} {{ {variants} }}", modifier(decl.visibility), decl.name.name)
        }
        _ => format!("{:?} statement at {}", item.node_kind(), item.position),
    }
}
