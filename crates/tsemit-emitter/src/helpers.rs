//! Runtime helpers requested by the lowering passes.
//!
//! A helper is a small support function (`__extends`, `__decorate`, ...)
//! written once at the top of every file (or bundle) that needs it. Passes
//! request helpers through `TransformContext::request_emit_helper`; the
//! printer writes them in priority order.

use std::cmp::Ordering;
use tsemit_ast::{EmitFlags, NodeArena, NodeIndex};

/// Helper body: fixed text, or text built around names made unique in the output file.
#[derive(Clone, Copy)]
pub enum HelperText {
    Static(&'static str),
    Generated(fn(&mut dyn FnMut(&str) -> String) -> String),
}

impl std::fmt::Debug for HelperText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HelperText::Static(text) => f.debug_tuple("Static").field(&text.len()).finish(),
            HelperText::Generated(_) => f.write_str("Generated"),
        }
    }
}

#[derive(Debug)]
pub struct EmitHelper {
    pub name: &'static str,
    /// Scoped helpers are emitted inside the scope that requested them and
    /// never deduplicated across a bundle.
    pub scoped: bool,
    /// Lower comes first; `None` sorts after every prioritized helper.
    pub priority: Option<u32>,
    /// Helpers whose text this one calls.
    pub dependencies: &'static [&'static EmitHelper],
    pub text: HelperText,
}

impl EmitHelper {
    /// Name exported by the runtime helper library, when it has one.
    pub fn import_name(&self) -> Option<&'static str> {
        if self.scoped { None } else { Some(self.name) }
    }
}

/// Priority order; helpers of equal priority keep request order under a stable sort.
pub fn compare_emit_helpers(a: &EmitHelper, b: &EmitHelper) -> Ordering {
    match (a.priority, b.priority) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Identifier naming a helper. Never renamed and never substituted.
pub fn create_helper_name(arena: &mut NodeArena, name: &str) -> NodeIndex {
    let id = arena.create_identifier(name);
    arena.add_emit_flags(id, EmitFlags::HELPER_NAME | EmitFlags::NO_SUBSTITUTION);
    id
}

/// Runtime helper library consulted under `importHelpers`.
pub const HELPER_MODULE: &str = "tslib";

// =============================================================================
// Helper definitions
// =============================================================================

pub static EXTENDS_HELPER: EmitHelper = EmitHelper {
    name: "__extends",
    scoped: false,
    priority: Some(0),
    dependencies: &[],
    text: HelperText::Static(
        r#"var __extends = (this && this.__extends) || (function () {
    var extendStatics = function (d, b) {
        extendStatics = Object.setPrototypeOf ||
            ({ __proto__: [] } instanceof Array && function (d, b) { d.__proto__ = b; }) ||
            function (d, b) { for (var p in b) if (b.hasOwnProperty(p)) d[p] = b[p]; };
        return extendStatics(d, b);
    };
    return function (d, b) {
        extendStatics(d, b);
        function __() { this.constructor = d; }
        d.prototype = b === null ? Object.create(b) : (__.prototype = b.prototype, new __());
    };
})();"#,
    ),
};

pub static ASSIGN_HELPER: EmitHelper = EmitHelper {
    name: "__assign",
    scoped: false,
    priority: Some(1),
    dependencies: &[],
    text: HelperText::Static(
        r#"var __assign = (this && this.__assign) || function () {
    __assign = Object.assign || function(t) {
        for (var s, i = 1, n = arguments.length; i < n; i++) {
            s = arguments[i];
            for (var p in s) if (Object.prototype.hasOwnProperty.call(s, p))
                t[p] = s[p];
        }
        return t;
    };
    return __assign.apply(this, arguments);
};"#,
    ),
};

pub static REST_HELPER: EmitHelper = EmitHelper {
    name: "__rest",
    scoped: false,
    priority: None,
    dependencies: &[],
    text: HelperText::Static(
        r#"var __rest = (this && this.__rest) || function (s, e) {
    var t = {};
    for (var p in s) if (Object.prototype.hasOwnProperty.call(s, p) && e.indexOf(p) < 0)
        t[p] = s[p];
    if (s != null && typeof Object.getOwnPropertySymbols === "function")
        for (var i = 0, p = Object.getOwnPropertySymbols(s); i < p.length; i++) {
            if (e.indexOf(p[i]) < 0 && Object.prototype.propertyIsEnumerable.call(s, p[i]))
                t[p[i]] = s[p[i]];
        }
    return t;
};"#,
    ),
};

pub static DECORATE_HELPER: EmitHelper = EmitHelper {
    name: "__decorate",
    scoped: false,
    priority: Some(2),
    dependencies: &[],
    text: HelperText::Static(
        r#"var __decorate = (this && this.__decorate) || function (decorators, target, key, desc) {
    var c = arguments.length, r = c < 3 ? target : desc === null ? desc = Object.getOwnPropertyDescriptor(target, key) : desc, d;
    if (typeof Reflect === "object" && typeof Reflect.decorate === "function") r = Reflect.decorate(decorators, target, key, desc);
    else for (var i = decorators.length - 1; i >= 0; i--) if (d = decorators[i]) r = (c < 3 ? d(r) : c > 3 ? d(target, key, r) : d(target, key)) || r;
    return c > 3 && r && Object.defineProperty(target, key, r), r;
};"#,
    ),
};

pub static METADATA_HELPER: EmitHelper = EmitHelper {
    name: "__metadata",
    scoped: false,
    priority: Some(3),
    dependencies: &[],
    text: HelperText::Static(
        r#"var __metadata = (this && this.__metadata) || function (k, v) {
    if (typeof Reflect === "object" && typeof Reflect.metadata === "function") return Reflect.metadata(k, v);
};"#,
    ),
};

pub static PARAM_HELPER: EmitHelper = EmitHelper {
    name: "__param",
    scoped: false,
    priority: Some(4),
    dependencies: &[],
    text: HelperText::Static(
        r#"var __param = (this && this.__param) || function (paramIndex, decorator) {
    return function (target, key) { decorator(target, key, paramIndex); }
};"#,
    ),
};

pub static VALUES_HELPER: EmitHelper = EmitHelper {
    name: "__values",
    scoped: false,
    priority: None,
    dependencies: &[],
    text: HelperText::Static(
        r#"var __values = (this && this.__values) || function(o) {
    var s = typeof Symbol === "function" && Symbol.iterator, m = s && o[s], i = 0;
    if (m) return m.call(o);
    if (o && typeof o.length === "number") return {
        next: function () {
            if (o && i >= o.length) o = void 0;
            return { value: o && o[i++], done: !o };
        }
    };
    throw new TypeError(s ? "Object is not iterable." : "Symbol.iterator is not defined.");
};"#,
    ),
};

pub static READ_HELPER: EmitHelper = EmitHelper {
    name: "__read",
    scoped: false,
    priority: None,
    dependencies: &[],
    text: HelperText::Static(
        r#"var __read = (this && this.__read) || function (o, n) {
    var m = typeof Symbol === "function" && o[Symbol.iterator];
    if (!m) return o;
    var i = m.call(o), r, ar = [], e;
    try {
        while ((n === void 0 || n-- > 0) && !(r = i.next()).done) ar.push(r.value);
    }
    catch (error) { e = { error: error }; }
    finally {
        try {
            if (r && !r.done && (m = i["return"])) m.call(i);
        }
        finally { if (e) throw e.error; }
    }
    return ar;
};"#,
    ),
};

pub static SPREAD_HELPER: EmitHelper = EmitHelper {
    name: "__spread",
    scoped: false,
    priority: None,
    dependencies: &[&READ_HELPER],
    text: HelperText::Static(
        r#"var __spread = (this && this.__spread) || function () {
    for (var ar = [], i = 0; i < arguments.length; i++) ar = ar.concat(__read(arguments[i]));
    return ar;
};"#,
    ),
};

pub static TEMPLATE_OBJECT_HELPER: EmitHelper = EmitHelper {
    name: "__makeTemplateObject",
    scoped: false,
    priority: Some(0),
    dependencies: &[],
    text: HelperText::Static(
        r#"var __makeTemplateObject = (this && this.__makeTemplateObject) || function (cooked, raw) {
    if (Object.defineProperty) { Object.defineProperty(cooked, "raw", { value: raw }); } else { cooked.raw = raw; }
    return cooked;
};"#,
    ),
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_ordering() {
        let mut helpers = [&PARAM_HELPER, &VALUES_HELPER, &EXTENDS_HELPER, &DECORATE_HELPER, &METADATA_HELPER];
        helpers.sort_by(|a, b| compare_emit_helpers(a, b));
        let names: Vec<_> = helpers.iter().map(|h| h.name).collect();
        assert_eq!(names, ["__extends", "__decorate", "__metadata", "__param", "__values"]);
    }

    #[test]
    fn test_helper_name_is_not_substituted() {
        let mut arena = NodeArena::new();
        let name = create_helper_name(&mut arena, "__extends");
        assert!(arena.emit_flags(name).contains(EmitFlags::NO_SUBSTITUTION | EmitFlags::HELPER_NAME));
        assert_eq!(arena.identifier_text(name), "__extends");
    }

    #[test]
    fn test_spread_depends_on_read() {
        assert_eq!(SPREAD_HELPER.dependencies.len(), 1);
        assert_eq!(SPREAD_HELPER.dependencies[0].name, "__read");
    }
}
