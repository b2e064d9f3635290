//! This library reads, edits and writes **DLG** conversation files used by the *Aurora* engine.
//!
//! # Dialog Format Documentation
//!
//! A dialog is a GFF file (see [`aurora_gff`]) with the file type `"DLG "`. The NPC's lines
//! (entries) and the player's lines (replies) are stored in two flat lists; the branching
//! structure is expressed by pointer structs that refer to nodes by their index in the opposite
//! list.
//!
//! ## Top-level fields
//!
//! | Label           | Type  | Description                                          |
//! |-----------------|-------|------------------------------------------------------|
//! | DelayEntry      | DWORD | Delay before entries                                 |
//! | DelayReply      | DWORD | Delay before replies                                 |
//! | NumWords        | DWORD | Word count over every node, recomputed on write      |
//! | EndConversation | ResRef| Script run when the conversation ends                |
//! | EndConverAbort  | ResRef| Script run when the conversation is aborted          |
//! | PreventZoomIn   | BYTE  | Keep the camera where it is                          |
//! | EntryList       | List  | Entry nodes, struct id = list position               |
//! | ReplyList       | List  | Reply nodes, struct id = list position               |
//! | StartingList    | List  | Start pointers (`Index`, `Active`) to entries        |
//!
//! ## Pointers
//!
//! Each node holds its pointers in `RepliesList` (entries) or `EntriesList` (replies). A pointer
//! holds the target's `Index`, an optional condition script `Active` and `IsChild`. A node that
//! is reachable from several places is stored once: the pointer that reaches it first when
//! walking depth-first from the start list owns it, and every other pointer has `IsChild` set
//! and may carry a `LinkComment`.
//!
//! ```
//! # fn doit() -> aurora_dlg::error::Result<()> {
//! use aurora_dlg::{Dialog, Node};
//! use aurora_gff::GffDocument;
//!
//! let mut dialog = Dialog::new();
//! let hello = dialog.add_entry(Node::new("Hello"));
//! let bye = dialog.add_reply(Node::new("Bye"));
//! dialog.add_start(hello)?;
//! dialog.connect(hello, bye)?;
//!
//! let bytes = dialog.encode()?;
//! let decoded = Dialog::decode(&bytes)?;
//! assert_eq!(decoded.entries().len(), 1);
//! # Ok(())
//! # }
//! # doit().unwrap();
//! ```

pub mod dialog;
pub mod error;
pub mod flowchart;
pub mod node;
mod schema;

pub use dialog::{Dialog, PointerSource};
pub use flowchart::{FlowLink, FlowNode, FlowNodeKind, Flowchart};
pub use node::{Node, NodeId, NodeKind, Pointer};
