use crate::commands::{access, export, filters, resources};

#[derive(Clone, Copy)]
pub struct ExampleGroup {
    pub title: &'static str,
    pub commands: &'static [&'static str],
}

#[derive(Clone, Copy)]
pub struct CommandExample {
    pub name: &'static str,
    pub groups: &'static [ExampleGroup],
}

pub fn command_examples() -> &'static [CommandExample] {
    &[
        CommandExample {
            name: "resources",
            groups: resources::EXAMPLES,
        },
        CommandExample {
            name: "compile",
            groups: filters::COMPILE_EXAMPLES,
        },
        CommandExample {
            name: "decompile",
            groups: filters::DECOMPILE_EXAMPLES,
        },
        CommandExample {
            name: "clean",
            groups: filters::CLEAN_EXAMPLES,
        },
        CommandExample {
            name: "can",
            groups: access::EXAMPLES,
        },
        CommandExample {
            name: "export",
            groups: export::EXAMPLES,
        },
    ]
}
