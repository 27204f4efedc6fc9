use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Maximum node height. Sixteen levels comfortably cover many millions of
/// entries at p = 0.5.
pub const MAX_LEVEL: usize = 16;

const P: f64 = 0.5;
const HEAD: usize = 0;

/// One entry in the list. Nodes live in the arena `Vec` of the owning
/// [`SkipList`]; `forward[i]` holds the arena index of the next node at
/// level `i`, and `span[i]` the number of base-level nodes that link jumps
/// over (destination included). `span[i]` is meaningful only while
/// `forward[i]` is set.
struct Node {
    member: String,
    score: f64,
    forward: Vec<Option<usize>>,
    span: Vec<usize>,
}

impl Node {
    fn new(level: usize, member: String, score: f64) -> Self {
        Node {
            member,
            score,
            forward: vec![None; level],
            span: vec![0; level],
        }
    }
}

/// Probabilistic ordered index over `(score, member)` pairs: lower score
/// first, ties broken by lexicographic member order. The per-level span
/// counts make rank and range-by-rank logarithmic as well.
///
/// Nodes are arena-allocated with index pointers; erased slots go on a free
/// list for reuse. Slot 0 is the sentinel head, which holds no user data
/// and is excluded from ranks and ranges.
pub struct SkipList {
    nodes: Vec<Node>,
    free: Vec<usize>,
    level: usize,
    len: usize,
    rng: StdRng,
}

impl SkipList {
    pub fn new() -> Self {
        SkipList {
            nodes: vec![Node::new(MAX_LEVEL, String::new(), f64::NEG_INFINITY)],
            free: Vec::new(),
            level: 1,
            len: 0,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 1 + geometric(p = 0.5), capped at [`MAX_LEVEL`].
    fn random_level(&mut self) -> usize {
        let mut level = 1;
        while self.rng.gen::<f64>() < P && level < MAX_LEVEL {
            level += 1;
        }
        level
    }

    /// Whether the node at `idx` orders strictly before `(score, member)`.
    fn precedes(&self, idx: usize, score: f64, member: &str) -> bool {
        let n = &self.nodes[idx];
        n.score < score || (n.score == score && n.member.as_str() < member)
    }

    fn is_exact(&self, idx: usize, score: f64, member: &str) -> bool {
        let n = &self.nodes[idx];
        n.score == score && n.member == member
    }

    fn alloc(&mut self, node: Node) -> usize {
        match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = node;
                slot
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    /// Inserts the pair, keeping spans consistent. Returns `false` without
    /// change when the exact `(score, member)` pair is already present.
    pub fn insert(&mut self, member: &str, score: f64) -> bool {
        let mut update = [HEAD; MAX_LEVEL];
        let mut rank = [0usize; MAX_LEVEL];
        let mut x = HEAD;
        for i in (0..self.level).rev() {
            rank[i] = if i == self.level - 1 { 0 } else { rank[i + 1] };
            while let Some(next) = self.nodes[x].forward[i] {
                if !self.precedes(next, score, member) {
                    break;
                }
                rank[i] += self.nodes[x].span[i];
                x = next;
            }
            update[i] = x;
        }

        if let Some(next) = self.nodes[update[0]].forward[0] {
            if self.is_exact(next, score, member) {
                return false;
            }
        }

        let new_level = self.random_level();
        if new_level > self.level {
            // update[] and rank[] are pre-filled with head / 0 for the
            // levels the search never visited.
            self.level = new_level;
        }

        let idx = self.alloc(Node::new(new_level, member.to_string(), score));
        for i in 0..new_level {
            let up = update[i];
            let next = self.nodes[up].forward[i];
            self.nodes[idx].forward[i] = next;
            if next.is_some() {
                // Split the predecessor's span at the insertion point.
                let up_span = self.nodes[up].span[i];
                self.nodes[idx].span[i] = up_span - (rank[0] - rank[i]);
            }
            self.nodes[up].forward[i] = Some(idx);
            self.nodes[up].span[i] = rank[0] - rank[i] + 1;
        }
        // Links above the new node's height now jump over one more entry.
        for i in new_level..self.level {
            let up = update[i];
            if self.nodes[up].forward[i].is_some() {
                self.nodes[up].span[i] += 1;
            }
        }
        self.len += 1;
        true
    }

    /// Removes the exact pair. Returns whether a node was removed.
    pub fn erase(&mut self, member: &str, score: f64) -> bool {
        let mut update = [HEAD; MAX_LEVEL];
        let mut x = HEAD;
        for i in (0..self.level).rev() {
            while let Some(next) = self.nodes[x].forward[i] {
                if !self.precedes(next, score, member) {
                    break;
                }
                x = next;
            }
            update[i] = x;
        }

        let target = match self.nodes[update[0]].forward[0] {
            Some(next) if self.is_exact(next, score, member) => next,
            _ => return false,
        };

        for i in 0..self.level {
            let up = update[i];
            if self.nodes[up].forward[i] == Some(target) {
                let next = self.nodes[target].forward[i];
                if next.is_some() {
                    // Absorb the removed node's span, minus itself.
                    let absorbed = self.nodes[target].span[i];
                    self.nodes[up].span[i] += absorbed - 1;
                } else {
                    self.nodes[up].span[i] = 0;
                }
                self.nodes[up].forward[i] = next;
            } else if self.nodes[up].forward[i].is_some() {
                self.nodes[up].span[i] -= 1;
            }
        }

        self.nodes[target] = Node::new(0, String::new(), 0.0);
        self.free.push(target);
        self.len -= 1;

        while self.level > 1 && self.nodes[HEAD].forward[self.level - 1].is_none() {
            self.level -= 1;
        }
        true
    }

    /// 0-based rank of the exact pair (head excluded), or `None` if absent.
    pub fn rank(&self, member: &str, score: f64) -> Option<usize> {
        let mut rank = 0;
        let mut x = HEAD;
        for i in (0..self.level).rev() {
            while let Some(next) = self.nodes[x].forward[i] {
                if !self.precedes(next, score, member) {
                    break;
                }
                rank += self.nodes[x].span[i];
                x = next;
            }
        }
        match self.nodes[x].forward[0] {
            Some(next) if self.is_exact(next, score, member) => Some(rank),
            _ => None,
        }
    }

    /// Members at 0-based ranks `[start, end]`, both inclusive. Negative
    /// bounds are rejected outright; resolving and clamping indices is the
    /// caller's job.
    pub fn range(&self, start: i64, end: i64) -> Vec<&str> {
        let mut out = Vec::new();
        if start < 0 || start > end {
            return out;
        }
        let start = start as usize;
        let mut remaining = end as usize - start + 1;

        let mut rank = 0usize;
        let mut x = HEAD;
        for i in (0..self.level).rev() {
            while let Some(next) = self.nodes[x].forward[i] {
                if rank + self.nodes[x].span[i] > start {
                    break;
                }
                rank += self.nodes[x].span[i];
                x = next;
            }
        }

        let mut cur = self.nodes[x].forward[0];
        while let Some(idx) = cur {
            if remaining == 0 {
                break;
            }
            remaining -= 1;
            out.push(self.nodes[idx].member.as_str());
            cur = self.nodes[idx].forward[0];
        }
        out
    }

    /// Members whose score lies between `min` and `max`, each bound
    /// optionally exclusive, in index order.
    pub fn range_by_score(
        &self,
        min: f64,
        min_exclusive: bool,
        max: f64,
        max_exclusive: bool,
    ) -> Vec<&str> {
        let mut x = HEAD;
        for i in (0..self.level).rev() {
            while let Some(next) = self.nodes[x].forward[i] {
                let s = self.nodes[next].score;
                if s < min || (min_exclusive && s == min) {
                    x = next;
                } else {
                    break;
                }
            }
        }

        let mut out = Vec::new();
        let mut cur = self.nodes[x].forward[0];
        while let Some(idx) = cur {
            let s = self.nodes[idx].score;
            if s > max || (max_exclusive && s == max) {
                break;
            }
            out.push(self.nodes[idx].member.as_str());
            cur = self.nodes[idx].forward[0];
        }
        out
    }
}

impl Default for SkipList {
    fn default() -> Self {
        SkipList::new()
    }
}
