//! Page Surface
//!
//! The DOM operations the board performs, behind a trait so the sync
//! logic runs against an in-memory page in tests.

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, Node};

use crate::error::{BoardError, BoardResult};
use crate::models::{TaskRef, TaskState};

pub trait Surface {
    /// A column's nested card list
    type List;
    /// Where a card sat before a move
    type Placement;

    /// List under the column whose `data-state` matches
    fn list_for_state(&self, state: TaskState) -> Option<Self::List>;

    fn placement_of(&self, task: &TaskRef) -> Option<Self::Placement>;

    /// Move the card to the front of `list`. False if no such card.
    fn prepend_card(&self, task: &TaskRef, list: &Self::List) -> bool;

    /// Put the card back where `placement` says it was
    fn restore_card(&self, task: &TaskRef, placement: Self::Placement) -> bool;

    fn has_element(&self, id: &str) -> bool;

    /// Replace `#anchor_id` with the element of the same id found in `html`.
    /// Ok(false) if the page has no such anchor.
    fn replace_anchor(&self, anchor_id: &str, html: &str) -> BoardResult<bool>;

    fn set_width_pct(&self, id: &str, pct: u32) -> bool;

    fn set_text(&self, id: &str, text: &str) -> bool;
}

/// Card position inside the live document
pub struct DomPlacement {
    parent: Node,
    next: Option<Node>,
}

/// Surface over the live document
pub struct DocumentSurface {
    document: Document,
}

impl DocumentSurface {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    pub fn current() -> Option<Self> {
        web_sys::window().and_then(|w| w.document()).map(Self::new)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    fn query(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }

    fn card(&self, task: &TaskRef) -> Option<Element> {
        self.query(&format!("[data-task=\"{}\"]", web_sys::css::escape(task.as_str())))
    }

    fn html_element(&self, id: &str) -> Option<HtmlElement> {
        self.document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    }
}

impl Surface for DocumentSurface {
    type List = Element;
    type Placement = DomPlacement;

    fn list_for_state(&self, state: TaskState) -> Option<Element> {
        self.query(&format!(
            ".col[data-state=\"{}\"] .list",
            web_sys::css::escape(state.as_str())
        ))
    }

    fn placement_of(&self, task: &TaskRef) -> Option<DomPlacement> {
        let card = self.card(task)?;
        let parent = card.parent_node()?;
        Some(DomPlacement {
            parent,
            next: card.next_sibling(),
        })
    }

    fn prepend_card(&self, task: &TaskRef, list: &Element) -> bool {
        match self.card(task) {
            Some(card) => list.prepend_with_node_1(&card).is_ok(),
            None => false,
        }
    }

    fn restore_card(&self, task: &TaskRef, placement: DomPlacement) -> bool {
        let Some(card) = self.card(task) else {
            return false;
        };
        // The old sibling may have moved too; fall back to the end of the list
        let next = placement
            .next
            .filter(|n| n.parent_node().is_some_and(|p| p.is_same_node(Some(&placement.parent))));
        match next {
            Some(next) => placement.parent.insert_before(&card, Some(&next)).is_ok(),
            None => placement.parent.append_child(&card).is_ok(),
        }
    }

    fn has_element(&self, id: &str) -> bool {
        self.document.get_element_by_id(id).is_some()
    }

    fn replace_anchor(&self, anchor_id: &str, html: &str) -> BoardResult<bool> {
        let Some(anchor) = self.document.get_element_by_id(anchor_id) else {
            return Ok(false);
        };
        let wrapper = self.document.create_element("div")?;
        wrapper.set_inner_html(html);
        let fresh = wrapper
            .query_selector(&format!("#{}", web_sys::css::escape(anchor_id)))?
            .ok_or_else(|| BoardError::Body(format!("fragment has no #{}", anchor_id)))?;
        anchor.replace_with_with_node_1(&fresh)?;
        Ok(true)
    }

    fn set_width_pct(&self, id: &str, pct: u32) -> bool {
        match self.html_element(id) {
            Some(el) => el.style().set_property("width", &format!("{}%", pct)).is_ok(),
            None => false,
        }
    }

    fn set_text(&self, id: &str, text: &str) -> bool {
        match self.document.get_element_by_id(id) {
            Some(el) => {
                el.set_text_content(Some(text));
                true
            }
            None => false,
        }
    }
}
