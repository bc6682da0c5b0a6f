//! Exact linear algebra over GF(2).
//!
//! A [`BitVec`] is a fixed-length vector over the two-element field, where
//! addition is bitwise XOR. Row reduction is performed on slices of
//! `BitVec`s, each of which is one row of an augmented matrix.

use std::{ fmt, ops::{ BitXor, BitXorAssign } };

const WORD: usize = u64::BITS as usize;

/// A fixed-length vector over GF(2), packed into 64-bit words.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BitVec {
    words: Vec<u64>,
    len: usize,
}

impl BitVec {
    /// Create a new all-zero vector of length `len`.
    pub fn zeros(len: usize) -> Self {
        Self { words: vec![0; len.div_ceil(WORD)], len }
    }

    /// Create a vector of length `len` with ones at the given indices.
    ///
    /// Repeated indices cancel pairwise.
    ///
    /// *Panics if any index is out of bounds.*
    pub fn from_ones<I>(len: usize, ones: I) -> Self
    where I: IntoIterator<Item = usize>
    {
        let mut v = Self::zeros(len);
        ones.into_iter().for_each(|k| { v.toggle(k); });
        v
    }

    /// Return a copy of `self` truncated or zero-padded to length `len`.
    pub fn resized(&self, len: usize) -> Self {
        let mut v = Self::zeros(len);
        self.iter_ones().take_while(|k| *k < len).for_each(|k| { v.set(k, true); });
        v
    }

    /// Return the length of the vector.
    pub fn len(&self) -> usize { self.len }

    /// Return `true` if the vector has length zero.
    pub fn is_empty(&self) -> bool { self.len == 0 }

    /// Return the entry at index `k`.
    ///
    /// *Panics if `k` is out of bounds.*
    pub fn get(&self, k: usize) -> bool {
        assert!(k < self.len, "BitVec::get: index {k} out of bounds for length {}", self.len);
        self.words[k / WORD] >> (k % WORD) & 1 == 1
    }

    /// Set the entry at index `k`.
    ///
    /// *Panics if `k` is out of bounds.*
    pub fn set(&mut self, k: usize, val: bool) {
        assert!(k < self.len, "BitVec::set: index {k} out of bounds for length {}", self.len);
        let mask = 1_u64 << (k % WORD);
        if val {
            self.words[k / WORD] |= mask;
        } else {
            self.words[k / WORD] &= !mask;
        }
    }

    /// Add 1 to the entry at index `k`.
    ///
    /// *Panics if `k` is out of bounds.*
    pub fn toggle(&mut self, k: usize) {
        assert!(k < self.len, "BitVec::toggle: index {k} out of bounds for length {}", self.len);
        self.words[k / WORD] ^= 1_u64 << (k % WORD);
    }

    /// Return `true` if every entry is zero.
    pub fn is_zero(&self) -> bool { self.words.iter().all(|w| *w == 0) }

    /// Return the number of nonzero entries.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Return the inner product of `self` and `other`.
    ///
    /// *Panics if the lengths differ.*
    pub fn dot(&self, other: &Self) -> bool {
        assert_eq!(self.len, other.len, "BitVec::dot: length mismatch");
        self.words.iter().zip(&other.words)
            .fold(0, |acc, (a, b)| acc ^ (a & b).count_ones())
            & 1 == 1
    }

    /// Return the index of the first nonzero entry at or after `start`.
    pub fn first_one_from(&self, start: usize) -> Option<usize> {
        if start >= self.len { return None; }
        let mut w = start / WORD;
        let mut word = self.words[w] & (u64::MAX << (start % WORD));
        loop {
            if word != 0 {
                let k = w * WORD + word.trailing_zeros() as usize;
                return (k < self.len).then_some(k);
            }
            w += 1;
            if w >= self.words.len() { return None; }
            word = self.words[w];
        }
    }

    /// Iterate over the indices of all nonzero entries in ascending order.
    pub fn iter_ones(&self) -> Ones<'_> {
        Ones { vec: self, next: 0 }
    }
}

impl fmt::Debug for BitVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitVec[")?;
        for k in 0..self.len {
            write!(f, "{}", u8::from(self.get(k)))?;
        }
        write!(f, "]")
    }
}

impl BitXorAssign<&BitVec> for BitVec {
    /// *Panics if the lengths differ.*
    fn bitxor_assign(&mut self, rhs: &BitVec) {
        assert_eq!(self.len, rhs.len, "BitVec::bitxor_assign: length mismatch");
        self.words.iter_mut().zip(&rhs.words).for_each(|(a, b)| { *a ^= b; });
    }
}

impl BitXor<&BitVec> for BitVec {
    type Output = BitVec;

    fn bitxor(mut self, rhs: &BitVec) -> Self::Output {
        self ^= rhs;
        self
    }
}

/// Iterator over the nonzero indices of a [`BitVec`].
///
/// The iterator item type is `usize`.
#[derive(Clone, Debug)]
pub struct Ones<'a> {
    vec: &'a BitVec,
    next: usize,
}

impl<'a> Iterator for Ones<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        let k = self.vec.first_one_from(self.next)?;
        self.next = k + 1;
        Some(k)
    }
}

impl<'a> std::iter::FusedIterator for Ones<'a> { }

/// Bring `rows`, an augmented matrix whose first `ncols` entries per row are
/// coefficients and whose entry at `ncols` is the right-hand side, into
/// reduced row-echelon form.
///
/// Pivots are chosen in ascending column order, taking the first eligible row
/// each time, so the result depends only on the input. Returns the pivot
/// column of each of the leading `rank` rows.
///
/// *Panics if any row is shorter than `ncols + 1`.*
pub fn rref(rows: &mut [BitVec], ncols: usize) -> Vec<usize> {
    let mut pivots: Vec<usize> = Vec::new();
    let mut rank: usize = 0;
    for col in 0..ncols {
        if rank == rows.len() { break; }
        let Some(r) = (rank..rows.len()).find(|r| rows[*r].get(col))
            else { continue; };
        rows.swap(rank, r);
        let pivot_row = rows[rank].clone();
        for (k, row) in rows.iter_mut().enumerate() {
            if k != rank && row.get(col) { *row ^= &pivot_row; }
        }
        pivots.push(col);
        rank += 1;
    }
    pivots
}

/// Solve the augmented system `rows` with `ncols` unknowns.
///
/// Returns `None` if the system is inconsistent. Otherwise free variables are
/// set to zero, which is the lexicographically smallest choice among all
/// solutions for the fixed column order.
pub fn solve(mut rows: Vec<BitVec>, ncols: usize) -> Option<BitVec> {
    let pivots = rref(&mut rows, ncols);
    let rank = pivots.len();
    let inconsistent = rows[rank..].iter().any(|row| row.get(ncols));
    if inconsistent { return None; }
    let mut x = BitVec::zeros(ncols);
    pivots.iter().zip(&rows)
        .for_each(|(col, row)| { x.set(*col, row.get(ncols)); });
    Some(x)
}

/// Return a basis of the null space of the `ncols`-column matrix `rows`.
///
/// There is one basis vector per free column of the reduced row-echelon form,
/// in ascending order of that column, with a one at the free column and zeros
/// at every other free column.
pub fn nullspace(mut rows: Vec<BitVec>, ncols: usize) -> Vec<BitVec> {
    let pivots = rref(&mut rows, ncols);
    let mut is_pivot = BitVec::zeros(ncols);
    pivots.iter().for_each(|col| { is_pivot.set(*col, true); });
    (0..ncols)
        .filter(|col| !is_pivot.get(*col))
        .map(|free| {
            let mut v = BitVec::zeros(ncols);
            v.set(free, true);
            pivots.iter().zip(&rows)
                .for_each(|(col, row)| { v.set(*col, row.get(free)); });
            v
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(bits: &str) -> BitVec {
        BitVec::from_ones(
            bits.len(),
            bits.chars().enumerate().filter_map(|(k, c)| (c == '1').then_some(k)),
        )
    }

    #[test]
    fn set_get_toggle() {
        let mut v = BitVec::zeros(130);
        assert!(v.is_zero());
        v.set(0, true);
        v.set(64, true);
        v.toggle(129);
        assert!(v.get(0) && v.get(64) && v.get(129));
        assert!(!v.get(1));
        assert_eq!(v.count_ones(), 3);
        v.toggle(64);
        assert_eq!(v.iter_ones().collect::<Vec<_>>(), vec![0, 129]);
        v.set(0, false);
        assert_eq!(v.first_one_from(0), Some(129));
        assert_eq!(v.first_one_from(130), None);
    }

    #[test]
    fn from_ones_cancels() {
        let v = BitVec::from_ones(8, [1, 3, 3, 5, 1, 1]);
        assert_eq!(v.iter_ones().collect::<Vec<_>>(), vec![1, 5]);
    }

    #[test]
    fn resized() {
        let v = row("1010011");
        assert_eq!(v.resized(9), row("101001100"));
        assert_eq!(v.resized(4), row("1010"));
    }

    #[test]
    fn xor_and_dot() {
        let a = row("1100101");
        let b = row("0110001");
        assert_eq!(a.clone() ^ &b, row("1010100"));
        assert!(!a.dot(&b));
        assert!(a.dot(&row("1000000")));
        assert!(!a.dot(&row("1100000")));
    }

    #[test]
    fn rref_pivots() {
        let mut rows = vec![row("0110"), row("1100"), row("1010")];
        let pivots = rref(&mut rows, 3);
        assert_eq!(pivots, vec![0, 1]);
        assert_eq!(rows[0], row("1010"));
        assert_eq!(rows[1], row("0110"));
        assert!(rows[2].is_zero());
    }

    #[test]
    fn solve_consistent() {
        // x0 + x1 = 1, x1 + x2 = 0
        let x = solve(vec![row("1101"), row("0110")], 3).unwrap();
        assert_eq!(x, row("100"));
        let x = solve(vec![row("0110"), row("1101")], 3).unwrap();
        assert_eq!(x, row("100"));
    }

    #[test]
    fn solve_inconsistent() {
        // x0 + x1 = 1, x0 + x1 = 0
        assert!(solve(vec![row("111"), row("110")], 2).is_none());
        // empty row with nonzero target
        assert!(solve(vec![row("001")], 2).is_none());
    }

    #[test]
    fn solve_empty() {
        let x = solve(Vec::new(), 4).unwrap();
        assert!(x.is_zero());
        assert_eq!(x.len(), 4);
    }

    #[test]
    fn nullspace_basis() {
        let kernel = nullspace(vec![row("110"), row("011")], 3);
        assert_eq!(kernel, vec![row("111")]);
        let kernel = nullspace(vec![], 2);
        assert_eq!(kernel, vec![row("10"), row("01")]);
        let rows = vec![row("1010"), row("0110"), row("1100")];
        let kernel = nullspace(rows.clone(), 4);
        assert_eq!(kernel.len(), 2);
        for v in kernel.iter() {
            assert!(rows.iter().all(|r| !r.dot(v)));
        }
    }
}
