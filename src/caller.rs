use std::path::Path;

/// Call-site metadata attached to `Error` and `Warn` records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerInfo {
    /// Fully qualified name of the originating function.
    pub function: String,
    /// Source file of the call site.
    pub file: String,
    /// Line number of the call site, 0 when unknown.
    pub line: u32,
}

/// Resolves the call site that invoked the logger.
///
/// This is the one deliberately narrow seam between the emitter and stack
/// introspection: the emitter only formats and escapes whatever the resolver
/// returns, and swapping the resolver (e.g. for tests, or for a cheaper
/// source of call-site data) never touches the emission pipeline. Resolution
/// runs only for `Error` and `Warn` records, which are rare enough that its
/// cost — including allocation — is acceptable.
pub trait CallerResolver: Send + Sync {
    /// Returns the originating call site, or `None` to omit the caller
    /// fields from the record.
    fn resolve(&self) -> Option<CallerInfo>;
}

/// Path markers that identify frames of the logging machinery itself, which
/// must be stepped over when walking the stack. Matching by marker instead of
/// a fixed frame-depth constant keeps the resolver correct when wrapper
/// frames are added or the optimizer in-lines intermediate calls.
const SKIP_MARKERS: [&str; 3] = ["backtrace::", "jsonlog::", "core::ops::function::"];

/// True when a demangled symbol name belongs to the stack walk or the
/// emission pipeline. Trait-impl frames demangle with a leading angle
/// bracket, e.g. `<jsonlog::caller::BacktraceResolver as
/// jsonlog::caller::CallerResolver>::resolve`, so the markers are matched
/// anywhere in the name rather than only at the front.
fn belongs_to_machinery(name: &str) -> bool {
    SKIP_MARKERS.iter().any(|m| name.contains(m))
}

/// Default [`CallerResolver`] backed by a stack walk.
///
/// Returns the first symbolized frame that does not belong to the logging
/// machinery. Always produces a value: when symbols are unavailable (stripped
/// binaries, missing debug info) the fields degrade to `<unknown>` so
/// `Error`/`Warn` records still carry their caller keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct BacktraceResolver;

impl BacktraceResolver {
    fn first_external_frame() -> Option<CallerInfo> {
        let mut found: Option<CallerInfo> = None;
        backtrace::trace(|frame| {
            let mut keep_walking = true;
            backtrace::resolve_frame(frame, |symbol| {
                if found.is_some() {
                    return;
                }
                let Some(name) = symbol.name() else {
                    return;
                };
                let name = trim_hash_suffix(&name.to_string());
                if belongs_to_machinery(&name) {
                    return;
                }
                found = Some(CallerInfo {
                    function: name,
                    file: symbol
                        .filename()
                        .map_or_else(|| "<unknown>".to_owned(), |f| display_path(f)),
                    line: symbol.lineno().unwrap_or(0),
                });
                keep_walking = false;
            });
            keep_walking
        });
        found
    }
}

impl CallerResolver for BacktraceResolver {
    fn resolve(&self) -> Option<CallerInfo> {
        Some(Self::first_external_frame().unwrap_or_else(|| CallerInfo {
            function: "<unknown>".to_owned(),
            file: "<unknown>".to_owned(),
            line: 0,
        }))
    }
}

/// Strips the trailing `::h<16 hex digits>` disambiguator from a demangled
/// symbol name, e.g. `app::run::h1a2b3c4d5e6f7a8b` becomes `app::run`.
fn trim_hash_suffix(name: &str) -> String {
    if let Some(pos) = name.rfind("::h") {
        let tail = &name[pos + 3..];
        if tail.len() == 16 && tail.bytes().all(|b| b.is_ascii_hexdigit()) {
            return name[..pos].to_owned();
        }
    }
    name.to_owned()
}

fn display_path(p: &Path) -> String {
    p.to_string_lossy().into_owned()
}
