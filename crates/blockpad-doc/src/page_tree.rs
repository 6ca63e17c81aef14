//! Page tree over a flat page list.
//!
//! Pages form a tree through nullable `parent_id` pointers; sibling order is
//! the order of the flat list. Nothing here holds an owned tree: children,
//! descendants and ancestors are recomputed from the list on demand, and every
//! walk is cycle-safe so a corrupted snapshot cannot hang it.
//!
//! Moves are functional like block mutations: they return the next list or
//! `None` if refused, leaving the input untouched.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use blockpad_types::{Page, PageId};

use crate::drag::{DropPosition, Rect, reorder};

/// Where a page dropped onto another page lands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::EnumString, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum TreeZone {
    /// Sibling before the target.
    Before,
    /// Sibling after the target.
    After,
    /// Child of the target.
    Inside,
}

impl Rect {
    /// Tree drop zone: top third before, bottom third after, middle third inside.
    pub fn third(&self, y: f32) -> TreeZone {
        let f = self.fraction(y);
        if f < 1.0 / 3.0 {
            TreeZone::Before
        } else if f > 2.0 / 3.0 {
            TreeZone::After
        } else {
            TreeZone::Inside
        }
    }
}

pub fn find<'a>(pages: &'a [Page], id: &PageId) -> Option<&'a Page> {
    pages.iter().find(|p| &p.id == id)
}

/// Top-level pages, in list order.
pub fn roots(pages: &[Page]) -> Vec<&Page> {
    pages.iter().filter(|p| p.is_root()).collect()
}

/// Direct children of a page, in list order.
pub fn children<'a>(pages: &'a [Page], id: &PageId) -> Vec<&'a Page> {
    pages
        .iter()
        .filter(|p| p.parent_id.as_ref() == Some(id))
        .collect()
}

/// Every page below `id` (children, grandchildren, ...). Excludes `id` itself.
pub fn descendants(pages: &[Page], id: &PageId) -> HashSet<PageId> {
    let mut found = HashSet::new();
    let mut frontier = vec![id.clone()];
    while let Some(parent) = frontier.pop() {
        for child in children(pages, &parent) {
            if &child.id != id && found.insert(child.id.clone()) {
                frontier.push(child.id.clone());
            }
        }
    }
    found
}

/// Parent chain of a page, nearest first, up to the root.
pub fn ancestors(pages: &[Page], id: &PageId) -> Vec<PageId> {
    let mut chain = Vec::new();
    let mut seen = HashSet::new();
    seen.insert(id.clone());
    let mut current = find(pages, id).and_then(|p| p.parent_id.clone());
    while let Some(parent) = current {
        if !seen.insert(parent.clone()) {
            break; // cycle
        }
        current = find(pages, &parent).and_then(|p| p.parent_id.clone());
        chain.push(parent);
    }
    chain
}

/// Whether `dragged` may be dropped relative to `target` in `zone`.
///
/// A page can never land inside itself or any of its descendants, which
/// would detach the subtree into a cycle.
pub fn can_drop(pages: &[Page], dragged: &PageId, target: &PageId, zone: TreeZone) -> bool {
    if dragged == target {
        return false;
    }
    if descendants(pages, dragged).contains(target) {
        return false;
    }
    match zone {
        TreeZone::Inside => true,
        // Sibling drops inherit the target's parent, which must not be inside us.
        TreeZone::Before | TreeZone::After => match find(pages, target) {
            Some(t) => t.parent_id.as_ref() != Some(dragged),
            None => false,
        },
    }
}

/// Move a page relative to another.
///
/// `Before`/`After` make it a sibling of the target (adopting the target's
/// parent) placed next to it; `Inside` makes it a child of the target.
/// Illegal moves are refused with a warning and return `None`.
pub fn move_page(pages: &[Page], dragged: &PageId, target: &PageId, zone: TreeZone) -> Option<Vec<Page>> {
    let target_page = find(pages, target)?;
    find(pages, dragged)?;

    if !can_drop(pages, dragged, target, zone) {
        warn!(
            "refused to move page {} {} {}: target is the page itself or one of its descendants",
            dragged, zone, target
        );
        return None;
    }

    let new_parent = match zone {
        TreeZone::Inside => Some(target.clone()),
        TreeZone::Before | TreeZone::After => target_page.parent_id.clone(),
    };

    let mut next = match zone {
        TreeZone::Before => reorder(pages, |p| &p.id, dragged, target, DropPosition::Before)?,
        TreeZone::After => reorder(pages, |p| &p.id, dragged, target, DropPosition::After)?,
        TreeZone::Inside => pages.to_vec(),
    };
    if let Some(page) = next.iter_mut().find(|p| &p.id == dragged) {
        page.parent_id = new_parent;
    }
    debug!("moved page {} {} {}", dragged, zone, target);
    Some(next)
}

/// Remove a page. Its children move up to the removed page's parent.
pub fn delete_page(pages: &[Page], id: &PageId) -> Option<Vec<Page>> {
    let removed = find(pages, id)?;
    let grandparent = removed.parent_id.clone();
    let next = pages
        .iter()
        .filter(|p| &p.id != id)
        .cloned()
        .map(|mut p| {
            if p.parent_id.as_ref() == Some(id) {
                p.parent_id = grandparent.clone();
            }
            p
        })
        .collect();
    debug!("deleted page {}", id);
    Some(next)
}

/// Pages in depth-first display order, with their depth.
///
/// Pages unreachable from a root (only possible with a parent cycle) are
/// listed last at depth 0 so nothing disappears.
pub fn outline(pages: &[Page]) -> Vec<(usize, &Page)> {
    let mut by_parent: HashMap<Option<&PageId>, Vec<&Page>> = HashMap::new();
    for page in pages {
        let parent = page
            .parent_id
            .as_ref()
            .filter(|p| find(pages, p).is_some());
        by_parent.entry(parent).or_default().push(page);
    }

    let mut out = Vec::with_capacity(pages.len());
    let mut seen = HashSet::new();
    let mut stack: Vec<(usize, &Page)> = by_parent
        .get(&None)
        .map(|r| r.iter().rev().map(|p| (0, *p)).collect())
        .unwrap_or_default();

    while let Some((depth, page)) = stack.pop() {
        if !seen.insert(&page.id) {
            continue;
        }
        out.push((depth, page));
        if let Some(kids) = by_parent.get(&Some(&page.id)) {
            stack.extend(kids.iter().rev().map(|p| (depth + 1, *p)));
        }
    }

    for page in pages {
        if !seen.contains(&page.id) {
            out.push((0, page));
        }
    }
    out
}

/// Indented text outline, one page per line.
pub fn render_outline(pages: &[Page]) -> String {
    let mut out = String::new();
    for (depth, page) in outline(pages) {
        out.push_str(&"  ".repeat(depth));
        out.push_str(&page.display_name());
        out.push_str(&format!("  [{}]\n", page.id.short()));
    }
    out
}

/// Detach dangling and cyclic parent pointers. Returns one note per fix.
pub fn repair_parents(pages: &mut [Page]) -> Vec<String> {
    let ids: HashSet<PageId> = pages.iter().map(|p| p.id.clone()).collect();
    let mut notes = Vec::new();

    for page in pages.iter_mut() {
        if let Some(parent) = &page.parent_id
            && (!ids.contains(parent) || parent == &page.id)
        {
            notes.push(format!("page {}: dropped invalid parent {}", page.id, parent));
            page.parent_id = None;
        }
    }

    // Any page whose ancestor walk loops back to itself sits on a cycle;
    // detach pages until none remain.
    loop {
        let snapshot: &[Page] = &*pages;
        let cyclic = snapshot.iter().find_map(|p| {
            let mut seen = HashSet::new();
            let mut current = p.parent_id.clone();
            while let Some(id) = current {
                if id == p.id {
                    return Some(p.id.clone());
                }
                if !seen.insert(id.clone()) {
                    return None;
                }
                current = find(snapshot, &id).and_then(|x| x.parent_id.clone());
            }
            None
        });
        let Some(id) = cyclic else { break };
        if let Some(page) = pages.iter_mut().find(|p| p.id == id) {
            notes.push(format!("page {}: broke parent cycle", page.id));
            page.parent_id = None;
        }
    }
    notes
}

// ============================================================================
// Tests
// ============================================================================
