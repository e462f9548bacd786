//! The eight canonicalization passes
//!
//! Each pass is a pure string rewrite over one field plus an optional usage
//! record. Applied in [`Pass::ALL`] order; every pass is idempotent and so is
//! the sequence.

use std::borrow::Cow;

use crate::config::CanonicalizeConfig;
use crate::features::symbol_tables::{FrequencyTables, FunctionSymbols};
use crate::shared::models::{InstructionUsage, Metadata};
use crate::shared::utils::tokens::{
    is_struct_like, rewrite_symbols, strip_metadata, strip_struct_suffix, DEREFERENCEABLE,
    INT_IMMEDIATE,
};

/// Read-only inputs shared by every pass of one function
#[derive(Clone, Copy)]
pub struct PassContext<'a> {
    pub symbols: &'a FunctionSymbols,
    pub metadata: &'a Metadata,
    pub frequency: &'a FrequencyTables,
    pub config: &'a CanonicalizeConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    StripAnnotations,
    StructSuffixes,
    Globals,
    Structs,
    Calls,
    Labels,
    Locals,
    Constants,
}

impl Pass {
    pub const ALL: [Pass; 8] = [
        Pass::StripAnnotations,
        Pass::StructSuffixes,
        Pass::Globals,
        Pass::Structs,
        Pass::Calls,
        Pass::Labels,
        Pass::Locals,
        Pass::Constants,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Pass::StripAnnotations => "strip_annotations",
            Pass::StructSuffixes => "struct_suffixes",
            Pass::Globals => "globals",
            Pass::Structs => "structs",
            Pass::Calls => "calls",
            Pass::Labels => "labels",
            Pass::Locals => "locals",
            Pass::Constants => "constants",
        }
    }

    pub fn apply<'t>(
        self,
        text: &'t str,
        ctx: &PassContext<'_>,
        usage: &mut InstructionUsage,
    ) -> Cow<'t, str> {
        match self {
            Pass::StripAnnotations => strip_metadata(text),
            Pass::StructSuffixes => strip_struct_suffixes(text, ctx),
            Pass::Globals => rename_globals(text, ctx, usage),
            Pass::Structs => rename_structs(text, ctx, usage),
            Pass::Calls => rename_calls(text, ctx, usage),
            Pass::Labels => rename_labels(text, ctx),
            Pass::Locals => rename_locals(text, ctx),
            Pass::Constants => normalize_constants(text, ctx, usage),
        }
    }
}

/// Run all passes in order
pub fn run_passes(text: &str, ctx: &PassContext<'_>, usage: &mut InstructionUsage) -> String {
    let mut current = text.to_string();
    for pass in Pass::ALL {
        // a pass may also shorten its input and still borrow it
        let next = match pass.apply(&current, ctx, usage) {
            Cow::Borrowed(kept) if kept.len() == current.len() => continue,
            rewritten => rewritten.into_owned(),
        };
        current = next;
    }
    current
}

fn strip_struct_suffixes<'t>(text: &'t str, ctx: &PassContext<'_>) -> Cow<'t, str> {
    rewrite_symbols(text, |token| {
        if !token.starts_with('%') {
            return None;
        }
        let base = strip_struct_suffix(token);
        let is_struct = is_struct_like(base) || ctx.metadata.has_struct(base);
        (is_struct && base.len() != token.len()).then(|| base.to_string())
    })
}

fn rename_globals<'t>(
    text: &'t str,
    ctx: &PassContext<'_>,
    usage: &mut InstructionUsage,
) -> Cow<'t, str> {
    rewrite_symbols(text, |token| {
        if !token.starts_with('@') || !ctx.metadata.has_global(token) {
            return None;
        }
        usage.record_global(token);
        ctx.symbols
            .globals
            .as_ref()
            .and_then(|g| g.get(token))
            .map(str::to_string)
    })
}

fn rename_structs<'t>(
    text: &'t str,
    ctx: &PassContext<'_>,
    usage: &mut InstructionUsage,
) -> Cow<'t, str> {
    rewrite_symbols(text, |token| {
        let renamed = ctx.symbols.structs.get(token).filter(|r| *r != token)?;
        usage.record_struct(token);
        Some(renamed.to_string())
    })
}

fn rename_calls<'t>(
    text: &'t str,
    ctx: &PassContext<'_>,
    usage: &mut InstructionUsage,
) -> Cow<'t, str> {
    rewrite_symbols(text, |token| {
        if let Some(renamed) = ctx.symbols.calls.get(token) {
            // already canonical on a second run
            if renamed == token {
                return None;
            }
            usage.record_call(token);
            return Some(renamed.to_string());
        }
        if ctx.symbols.is_exempt_call(token) {
            usage.record_call(token);
        }
        None
    })
}

fn rename_labels<'t>(text: &'t str, ctx: &PassContext<'_>) -> Cow<'t, str> {
    rewrite_symbols(text, |token| ctx.symbols.labels.get(token).map(str::to_string))
}

fn rename_locals<'t>(text: &'t str, ctx: &PassContext<'_>) -> Cow<'t, str> {
    rewrite_symbols(text, |token| {
        ctx.symbols
            .params
            .get(token)
            .or_else(|| ctx.symbols.vars.get(token))
            .map(str::to_string)
    })
}

fn normalize_constants<'t>(
    text: &'t str,
    ctx: &PassContext<'_>,
    usage: &mut InstructionUsage,
) -> Cow<'t, str> {
    let placeholder = ctx.config.constant_placeholder.as_str();
    let mut keep = |value: &str| -> bool {
        usage.record_constant(value);
        ctx.frequency.is_common_constant(value)
            || value
                .parse::<i128>()
                .map(|v| ctx.config.is_always_literal(v))
                .unwrap_or(false)
    };

    let text = INT_IMMEDIATE.replace_all(text, |caps: &regex::Captures| {
        if keep(&caps[2]) {
            caps[0].to_string()
        } else {
            format!("{} {}", &caps[1], placeholder)
        }
    });
    let rewritten = match DEREFERENCEABLE.replace_all(&text, |caps: &regex::Captures| {
        if keep(&caps[2]) {
            caps[0].to_string()
        } else {
            format!("{}({})", &caps[1], placeholder)
        }
    }) {
        Cow::Owned(rewritten) => Some(rewritten),
        Cow::Borrowed(_) => None,
    };

    match rewritten {
        Some(rewritten) => Cow::Owned(rewritten),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LabelStyle;

    struct Fixture {
        symbols: FunctionSymbols,
        metadata: Metadata,
        frequency: FrequencyTables,
        config: CanonicalizeConfig,
    }

    impl Fixture {
        fn new() -> Self {
            let mut symbols = FunctionSymbols::new(LabelStyle::Label, false);
            symbols.params.insert("%0");
            symbols.labels.insert("%entry");
            symbols.labels.insert("%7");
            symbols.vars.insert("%x");
            symbols.vars.insert("%10");
            symbols.structs.insert("%struct.node");
            symbols.calls.insert("@helper");
            symbols.note_exempt_call("@llvm.memset.p0.i64");

            let metadata = Metadata::from_json(
                r#"{"@counter": {"type": "int"}}"#,
                r#"{"%struct.node": []}"#,
            )
            .unwrap();

            Self {
                symbols,
                metadata,
                frequency: FrequencyTables::empty(),
                config: CanonicalizeConfig::default(),
            }
        }

        fn ctx(&self) -> PassContext<'_> {
            PassContext {
                symbols: &self.symbols,
                metadata: &self.metadata,
                frequency: &self.frequency,
                config: &self.config,
            }
        }
    }

    #[test]
    fn test_full_pipeline() {
        let fx = Fixture::new();
        let mut usage = InstructionUsage::default();
        let out = run_passes(
            r#"%10 = call ptr @helper(ptr %"struct.node.3"* %x, i32 %0, i64 1048576, i32 1), !dbg !42"#,
            &fx.ctx(),
            &mut usage,
        );
        assert_eq!(
            out,
            "%var1 = call ptr @function_0(ptr %struct_0* %var0, i32 %arg1, i64 <const>, i32 1)"
        );
        assert_eq!(usage.calls, vec!["@helper"]);
        assert_eq!(usage.structs, vec!["%struct.node"]);
        assert_eq!(usage.constants, vec!["1048576", "1"]);
    }

    #[test]
    fn test_each_pass_is_idempotent() {
        let fx = Fixture::new();
        let ctx = fx.ctx();
        let samples = [
            "store i32 %x, ptr @counter, align 4, !tbaa !3",
            "br i1 %x, label %entry, label %7",
            "call void @llvm.memset.p0.i64(ptr dereferenceable(24) %x, i8 0, i64 24, i1 false)",
            "%10 = getelementptr inbounds %struct.node.12, ptr %x, i32 0, i32 2",
        ];
        for sample in samples {
            let mut current = sample.to_string();
            for pass in Pass::ALL {
                let once = pass.apply(&current, &ctx, &mut InstructionUsage::default()).into_owned();
                let twice = pass.apply(&once, &ctx, &mut InstructionUsage::default()).into_owned();
                assert_eq!(once, twice, "pass {} not idempotent on `{}`", pass.name(), sample);
                current = once;
            }
        }
    }

    #[test]
    fn test_labels_and_exempt_calls() {
        let fx = Fixture::new();
        let mut usage = InstructionUsage::default();
        let out = run_passes("br i1 %x, label %entry, label %7", &fx.ctx(), &mut usage);
        assert_eq!(out, "br i1 %var0, label %label_0, label %label_1");

        let mut usage = InstructionUsage::default();
        let out = run_passes(
            "call void @llvm.memset.p0.i64(ptr dereferenceable(24) %x, i8 0, i64 24, i1 false)",
            &fx.ctx(),
            &mut usage,
        );
        assert_eq!(
            out,
            "call void @llvm.memset.p0.i64(ptr dereferenceable(<const>) %var0, i8 0, i64 <const>, i1 false)"
        );
        assert_eq!(usage.calls, vec!["@llvm.memset.p0.i64"]);
    }

    #[test]
    fn test_annotations_stripped_without_other_rewrites() {
        let fx = Fixture::new();
        let mut usage = InstructionUsage::default();
        let out = run_passes("store i32 0, ptr @counter, align 4, !tbaa !7", &fx.ctx(), &mut usage);
        assert_eq!(out, "store i32 0, ptr @counter, align 4");

        let out = run_passes("ret void, !dbg !12", &fx.ctx(), &mut usage);
        assert_eq!(out, "ret void");
    }

    #[test]
    fn test_globals_identity_but_recorded() {
        let fx = Fixture::new();
        let mut usage = InstructionUsage::default();
        let out = run_passes("%v = load i32, ptr @counter, align 4", &fx.ctx(), &mut usage);
        assert_eq!(out, "%v = load i32, ptr @counter, align 4");
        assert_eq!(usage.globals, vec!["@counter"]);
    }

    #[test]
    fn test_common_constant_kept() {
        let mut fx = Fixture::new();
        fx.frequency = FrequencyTables::from_json_str(
            Some(r#"{"4096": 10}"#),
            None,
            &Default::default(),
        )
        .unwrap();
        let mut usage = InstructionUsage::default();
        let out = run_passes("%x = and i64 %0, 4096", &fx.ctx(), &mut usage);
        // untyped immediates are left alone
        assert_eq!(out, "%var0 = and i64 %arg1, 4096");

        let out = run_passes("%x = and i64 4096, i64 4097", &fx.ctx(), &mut usage);
        assert_eq!(out, "%var0 = and i64 4096, i64 <const>");
    }
}
