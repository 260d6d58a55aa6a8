//! Action enum: everything components can ask the App to do.

use crate::intent::UserIntent;

/// All actions that can flow through the front-end.
/// Components produce Actions; the App dispatches them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // ── Client intents (forwarded to the core) ───────────────────────────────
    Intent(UserIntent),

    // ── Navigation ───────────────────────────────────────────────────────────
    SelectUp(usize),
    SelectDown(usize),
    SelectFirst,
    SelectLast,
    /// Move the cursor onto the selected (or active) station.
    JumpToCurrent,

    // ── Prompts ──────────────────────────────────────────────────────────────
    /// Answer to the open confirmation modal.
    Answer(bool),
    /// Close the acknowledgement modal.
    Dismiss,

    // ── UI toggles ───────────────────────────────────────────────────────────
    ToggleHelp,
    ToggleKeys,

    // ── System ───────────────────────────────────────────────────────────────
    Quit,
}
