//! Longest-common-subsequence alignment producing difflib-style opcodes.

/// Classification of one aligned range pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Equal,
    Replace,
    Delete,
    Insert,
}

/// One aligned range pair: `a[a_start..a_end]` against `b[b_start..b_end]`.
/// Opcodes partition both sequences completely and in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    pub tag: Tag,
    pub a_start: usize,
    pub a_end: usize,
    pub b_start: usize,
    pub b_end: usize,
}

/// Align two sequences and partition them into equal / replace / delete /
/// insert ranges. Moves surface as a delete plus an insert; arbitrary
/// insertions and deletions anywhere in either sequence are handled.
///
/// Two empty sequences yield no opcodes. Disjoint sequences yield a single
/// replace (or a lone delete/insert when one side is empty).
pub fn opcodes<T: PartialEq>(a: &[T], b: &[T]) -> Vec<Opcode> {
    let matches = lcs_matches(a, b);

    let mut ops = Vec::new();
    let mut a_pos = 0;
    let mut b_pos = 0;
    let mut k = 0;
    while k < matches.len() {
        let (mi, mj) = matches[k];
        push_gap(&mut ops, a_pos, mi, b_pos, mj);

        // Extend the run of consecutive matches into one equal block.
        let (start_i, start_j) = (mi, mj);
        let (mut end_i, mut end_j) = (mi, mj);
        while k + 1 < matches.len() && matches[k + 1] == (end_i + 1, end_j + 1) {
            k += 1;
            end_i += 1;
            end_j += 1;
        }
        ops.push(Opcode {
            tag: Tag::Equal,
            a_start: start_i,
            a_end: end_i + 1,
            b_start: start_j,
            b_end: end_j + 1,
        });
        a_pos = end_i + 1;
        b_pos = end_j + 1;
        k += 1;
    }
    push_gap(&mut ops, a_pos, a.len(), b_pos, b.len());
    ops
}

fn push_gap(ops: &mut Vec<Opcode>, a_start: usize, a_end: usize, b_start: usize, b_end: usize) {
    let tag = match (a_start < a_end, b_start < b_end) {
        (true, true) => Tag::Replace,
        (true, false) => Tag::Delete,
        (false, true) => Tag::Insert,
        (false, false) => return,
    };
    ops.push(Opcode {
        tag,
        a_start,
        a_end,
        b_start,
        b_end,
    });
}

/// Matched index pairs of a longest common subsequence, in order.
fn lcs_matches<T: PartialEq>(a: &[T], b: &[T]) -> Vec<(usize, usize)> {
    let n = a.len();
    let m = b.len();
    if n == 0 || m == 0 {
        return Vec::new();
    }

    // dp[i * (m + 1) + j] = LCS length of a[..i] and b[..j].
    let width = m + 1;
    let mut dp = vec![0usize; (n + 1) * width];
    for i in 1..=n {
        for j in 1..=m {
            dp[i * width + j] = if a[i - 1] == b[j - 1] {
                dp[(i - 1) * width + (j - 1)] + 1
            } else {
                dp[(i - 1) * width + j].max(dp[i * width + (j - 1)])
            };
        }
    }

    let mut matches = Vec::with_capacity(dp[n * width + m]);
    let mut i = n;
    let mut j = m;
    while i > 0 && j > 0 {
        if a[i - 1] == b[j - 1] {
            matches.push((i - 1, j - 1));
            i -= 1;
            j -= 1;
        } else if dp[(i - 1) * width + j] >= dp[i * width + (j - 1)] {
            i -= 1;
        } else {
            j -= 1;
        }
    }
    matches.reverse();
    matches
}
