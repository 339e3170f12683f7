//! HTML reference rewriting
//!
//! Pages are re-parsed into a mutable DOM (`tl`) and every `href`, `src`,
//! `srcset` and `<style>` reference is pointed at the local copy of its target.

mod html;
mod srcset;

pub use html::{local_reference, HtmlRewriter, IsMirrored};
pub use srcset::{parse_srcset, SrcsetCandidate};
