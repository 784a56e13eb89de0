//! Buchheim/Walker tidy tree placement.
//!
//! Linear-time Reingold–Tilford variant: a post-order first walk places each
//! subtree against its left siblings using contour threads, and a pre-order
//! second walk accumulates modifiers into final coordinates.
//!
//! Coordinates are in sibling units: adjacent siblings sit 1 apart and
//! adjacent cousins 2 apart. The caller scales them.

/// Per-node working state. Index `len - 1` is a sentinel parent of the root.
#[derive(Debug, Clone)]
struct Slot {
    parent: usize,
    children: Vec<usize>,
    /// Position among siblings.
    number: usize,
    /// Default ancestor handed to `apportion` for the next child.
    default_ancestor: Option<usize>,
    ancestor: usize,
    prelim: f64,
    modifier: f64,
    change: f64,
    shift: f64,
    thread: Option<usize>,
    x: f64,
}

struct Tidy {
    slots: Vec<Slot>,
}

/// Places a rooted tree given as child lists, root at index 0.
///
/// Returns one sibling-axis coordinate per node; the root sits at 0.
pub(crate) fn tidy_positions(children: &[Vec<usize>]) -> Vec<f64> {
    if children.is_empty() {
        return Vec::new();
    }
    let sentinel = children.len();
    let mut slots: Vec<Slot> = (0..=sentinel)
        .map(|index| Slot {
            parent: sentinel,
            children: Vec::new(),
            number: 0,
            default_ancestor: None,
            ancestor: index,
            prelim: 0.0,
            modifier: 0.0,
            change: 0.0,
            shift: 0.0,
            thread: None,
            x: 0.0,
        })
        .collect();
    slots[sentinel].children = vec![0];
    for (parent, kids) in children.iter().enumerate() {
        for (number, &child) in kids.iter().enumerate() {
            slots[child].parent = parent;
            slots[child].number = number;
        }
        slots[parent].children = kids.clone();
    }

    let mut tidy = Tidy { slots };
    for v in post_order(children) {
        tidy.first_walk(v);
    }
    tidy.slots[sentinel].modifier = -tidy.slots[0].prelim;
    for v in pre_order(children) {
        tidy.second_walk(v);
    }
    tidy.slots.truncate(sentinel);
    tidy.slots.into_iter().map(|slot| slot.x).collect()
}

impl Tidy {
    fn separation(&self, a: usize, b: usize) -> f64 {
        if self.slots[a].parent == self.slots[b].parent {
            1.0
        } else {
            2.0
        }
    }

    fn next_left(&self, v: usize) -> Option<usize> {
        self.slots[v]
            .children
            .first()
            .copied()
            .or(self.slots[v].thread)
    }

    fn next_right(&self, v: usize) -> Option<usize> {
        self.slots[v]
            .children
            .last()
            .copied()
            .or(self.slots[v].thread)
    }

    fn move_subtree(&mut self, wm: usize, wp: usize, shift: f64) {
        let gap = self.slots[wp]
            .number
            .saturating_sub(self.slots[wm].number)
            .max(1);
        let change = shift / gap as f64;
        self.slots[wp].change -= change;
        self.slots[wp].shift += shift;
        self.slots[wm].change += change;
        self.slots[wp].prelim += shift;
        self.slots[wp].modifier += shift;
    }

    fn execute_shifts(&mut self, v: usize) {
        let mut shift = 0.0;
        let mut change = 0.0;
        for i in (0..self.slots[v].children.len()).rev() {
            let w = self.slots[v].children[i];
            self.slots[w].prelim += shift;
            self.slots[w].modifier += shift;
            change += self.slots[w].change;
            shift += self.slots[w].shift + change;
        }
    }

    fn next_ancestor(&self, vim: usize, v: usize, ancestor: usize) -> usize {
        let candidate = self.slots[vim].ancestor;
        if self.slots[candidate].parent == self.slots[v].parent {
            candidate
        } else {
            ancestor
        }
    }

    fn first_walk(&mut self, v: usize) {
        let parent = self.slots[v].parent;
        let number = self.slots[v].number;
        let left = (number > 0).then(|| self.slots[parent].children[number - 1]);

        let first_child = self.slots[v].children.first().copied();
        let last_child = self.slots[v].children.last().copied();
        if let (Some(first), Some(last)) = (first_child, last_child) {
            self.execute_shifts(v);
            let midpoint = (self.slots[first].prelim + self.slots[last].prelim) / 2.0;
            if let Some(w) = left {
                self.slots[v].prelim = self.slots[w].prelim + self.separation(v, w);
                self.slots[v].modifier = self.slots[v].prelim - midpoint;
            } else {
                self.slots[v].prelim = midpoint;
            }
        } else if let Some(w) = left {
            self.slots[v].prelim = self.slots[w].prelim + self.separation(v, w);
        }

        let ancestor = self.slots[parent]
            .default_ancestor
            .unwrap_or(self.slots[parent].children[0]);
        let ancestor = self.apportion(v, left, ancestor);
        self.slots[parent].default_ancestor = Some(ancestor);
    }

    fn apportion(&mut self, v: usize, left: Option<usize>, mut ancestor: usize) -> usize {
        let Some(w) = left else {
            return ancestor;
        };
        let mut vip = v;
        let mut vop = v;
        let mut vim = w;
        let mut vom = self.slots[self.slots[v].parent].children[0];
        let mut sip = self.slots[vip].modifier;
        let mut sop = self.slots[vop].modifier;
        let mut sim = self.slots[vim].modifier;
        let mut som = self.slots[vom].modifier;

        let mut next_im = self.next_right(vim);
        let mut next_ip = self.next_left(vip);
        while let (Some(im), Some(ip)) = (next_im, next_ip) {
            vim = im;
            vip = ip;
            vom = self.next_left(vom).unwrap_or(vom);
            vop = self.next_right(vop).unwrap_or(vop);
            self.slots[vop].ancestor = v;

            let shift = self.slots[vim].prelim + sim - self.slots[vip].prelim - sip
                + self.separation(vim, vip);
            if shift > 0.0 {
                let wm = self.next_ancestor(vim, v, ancestor);
                self.move_subtree(wm, v, shift);
                sip += shift;
                sop += shift;
            }

            sim += self.slots[vim].modifier;
            sip += self.slots[vip].modifier;
            som += self.slots[vom].modifier;
            sop += self.slots[vop].modifier;
            next_im = self.next_right(vim);
            next_ip = self.next_left(vip);
        }

        if let Some(im) = next_im {
            if self.next_right(vop).is_none() {
                self.slots[vop].thread = Some(im);
                self.slots[vop].modifier += sim - sop;
            }
        }
        if let Some(ip) = next_ip {
            if self.next_left(vom).is_none() {
                self.slots[vom].thread = Some(ip);
                self.slots[vom].modifier += sip - som;
                ancestor = v;
            }
        }
        ancestor
    }

    fn second_walk(&mut self, v: usize) {
        let parent_modifier = self.slots[self.slots[v].parent].modifier;
        self.slots[v].x = self.slots[v].prelim + parent_modifier;
        self.slots[v].modifier += parent_modifier;
    }
}

fn pre_order(children: &[Vec<usize>]) -> Vec<usize> {
    let mut order = Vec::with_capacity(children.len());
    let mut stack = vec![0];
    while let Some(v) = stack.pop() {
        order.push(v);
        stack.extend(children[v].iter().rev().copied());
    }
    order
}

fn post_order(children: &[Vec<usize>]) -> Vec<usize> {
    let mut order = Vec::with_capacity(children.len());
    let mut stack = vec![0];
    while let Some(v) = stack.pop() {
        order.push(v);
        stack.extend(children[v].iter().copied());
    }
    order.reverse();
    order
}

#[cfg(test)]
mod tests {
    use super::tidy_positions;

    #[test]
    fn single_root_sits_at_origin() {
        assert_eq!(tidy_positions(&[vec![]]), vec![0.0]);
    }

    #[test]
    fn siblings_are_one_unit_apart_and_parent_is_centered() {
        let positions = tidy_positions(&[vec![1, 2, 3], vec![], vec![], vec![]]);
        assert_eq!(positions[1], -1.0);
        assert_eq!(positions[2], 0.0);
        assert_eq!(positions[3], 1.0);
        assert_eq!(positions[0], 0.0);
    }

    #[test]
    fn cousins_are_two_units_apart() {
        // 0 -> (1 -> 3), (2 -> 4)
        let positions = tidy_positions(&[vec![1, 2], vec![3], vec![4], vec![], vec![]]);
        assert_eq!(positions[4] - positions[3], 2.0);
        assert_eq!(positions[2] - positions[1], 2.0);
    }

    #[test]
    fn deep_subtrees_do_not_overlap() {
        // 0 -> 1, 2 ; 1 -> 3, 4 ; 2 -> 5, 6
        let children = vec![vec![1, 2], vec![3, 4], vec![5, 6], vec![], vec![], vec![], vec![]];
        let positions = tidy_positions(&children);
        let mut leaves = vec![positions[3], positions[4], positions[5], positions[6]];
        leaves.sort_by(f64::total_cmp);
        for pair in leaves.windows(2) {
            assert!(pair[1] - pair[0] >= 1.0 - 1e-9);
        }
    }
}
