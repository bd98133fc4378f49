// Static board geometry: adjacency, mill lines and the eight symmetries of
// the square, all indexed 0..23.
//
// ```text
//  0 ----------- 1 ----------- 2
//  |             |             |
//  |    3 ------ 4 ------ 5    |
//  |    |        |        |    |
//  |    |   6 -- 7 -- 8   |    |
//  |    |   |         |   |    |
//  9 -- 10 - 11        12 - 13 - 14
//  |    |   |         |   |    |
//  |    |   15 - 16 - 17  |    |
//  |    |        |        |    |
//  |    18 ----- 19 ----- 20   |
//  |             |             |
//  21 ---------- 22 ---------- 23
// ```

use std::sync::OnceLock;

pub const NUM_POSITIONS: usize = 24;
pub const GRID_SIZE: usize = 7;

/// 7x7 layout used for coordinates and symmetry construction.
pub const GRID_7X7: [[Option<usize>; GRID_SIZE]; GRID_SIZE] = [
    [Some(0), None, None, Some(1), None, None, Some(2)],
    [None, Some(3), None, Some(4), None, Some(5), None],
    [None, None, Some(6), Some(7), Some(8), None, None],
    [Some(9), Some(10), Some(11), None, Some(12), Some(13), Some(14)],
    [None, None, Some(15), Some(16), Some(17), None, None],
    [None, Some(18), None, Some(19), None, Some(20), None],
    [Some(21), None, None, Some(22), None, None, Some(23)],
];

pub const NEIGHBORS: [&[usize]; NUM_POSITIONS] = [
    &[1, 9],
    &[0, 2, 4],
    &[1, 14],
    &[4, 10],
    &[1, 3, 5, 7],
    &[4, 13],
    &[7, 11],
    &[4, 6, 8],
    &[7, 12],
    &[0, 10, 21],
    &[3, 9, 11, 18],
    &[6, 10, 15],
    &[8, 13, 17],
    &[5, 12, 14, 20],
    &[2, 13, 23],
    &[11, 16],
    &[15, 17, 19],
    &[12, 16],
    &[10, 19],
    &[16, 18, 20, 22],
    &[13, 19],
    &[9, 22],
    &[19, 21, 23],
    &[14, 22],
];

pub const MILLS: [[usize; 3]; 16] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [9, 10, 11],
    [12, 13, 14],
    [15, 16, 17],
    [18, 19, 20],
    [21, 22, 23],
    [0, 9, 21],
    [3, 10, 18],
    [6, 11, 15],
    [1, 4, 7],
    [16, 19, 22],
    [8, 12, 17],
    [5, 13, 20],
    [2, 14, 23],
];

pub type SymmetryMap = [usize; NUM_POSITIONS];

static COORDS: OnceLock<[(usize, usize); NUM_POSITIONS]> = OnceLock::new();
static SYMMETRIES: OnceLock<[SymmetryMap; 8]> = OnceLock::new();
static MILLS_BY_POS: OnceLock<[[usize; 2]; NUM_POSITIONS]> = OnceLock::new();

/// (row, col) of a position inside [`GRID_7X7`].
pub fn coord_of(pos: usize) -> (usize, usize) {
    init_coords()[pos]
}

pub fn index_at(row: usize, col: usize) -> Option<usize> {
    GRID_7X7.get(row).and_then(|r| r.get(col)).copied().flatten()
}

fn init_coords() -> &'static [(usize, usize); NUM_POSITIONS] {
    COORDS.get_or_init(|| {
        let mut t = [(0usize, 0usize); NUM_POSITIONS];
        for (r, row) in GRID_7X7.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if let Some(pos) = cell {
                    t[*pos] = (r, c);
                }
            }
        }
        t
    })
}

fn rot90(r: usize, c: usize) -> (usize, usize) {
    (c, GRID_SIZE - 1 - r)
}

fn reflect(r: usize, c: usize) -> (usize, usize) {
    (r, GRID_SIZE - 1 - c)
}

// 0..4 rotate by 90 degrees k times; 4..8 reflect first, then rotate.
fn transform(kind: usize, r: usize, c: usize) -> (usize, usize) {
    let (mut r, mut c) = if kind >= 4 { reflect(r, c) } else { (r, c) };
    for _ in 0..(kind % 4) {
        (r, c) = rot90(r, c);
    }
    (r, c)
}

/// Index permutations for identity, the three rotations and the four
/// reflections. `map[i]` is where position `i` lands.
pub fn symmetries() -> &'static [SymmetryMap; 8] {
    SYMMETRIES.get_or_init(|| {
        let coords = init_coords();
        let mut maps = [[0usize; NUM_POSITIONS]; 8];
        for (kind, map) in maps.iter_mut().enumerate() {
            for (pos, &(r, c)) in coords.iter().enumerate() {
                let (r2, c2) = transform(kind, r, c);
                // The grid is closed under the dihedral group, so every image is a board point.
                map[pos] = index_at(r2, c2).unwrap_or(pos);
            }
        }
        maps
    })
}

/// Permutes a board-shaped array through a symmetry map.
pub fn apply_symmetry<T: Copy + Default>(board: &[T; NUM_POSITIONS], map: &SymmetryMap) -> [T; NUM_POSITIONS] {
    let mut out = [T::default(); NUM_POSITIONS];
    for (idx, &mapped) in map.iter().enumerate() {
        out[mapped] = board[idx];
    }
    out
}

/// The two mill lines passing through `pos`.
pub fn mills_containing(pos: usize) -> impl Iterator<Item = &'static [usize; 3]> {
    let by_pos = MILLS_BY_POS.get_or_init(|| {
        let mut t = [[0usize; 2]; NUM_POSITIONS];
        let mut fill = [0usize; NUM_POSITIONS];
        for (mi, line) in MILLS.iter().enumerate() {
            for &p in line {
                t[p][fill[p]] = mi;
                fill[p] += 1;
            }
        }
        t
    });
    by_pos[pos].iter().map(|&mi| &MILLS[mi])
}

/// Concentric ring of a position: 0 outer, 1 middle, 2 inner.
pub fn ring_of(pos: usize) -> usize {
    let (r, c) = coord_of(pos);
    r.min(c).min(GRID_SIZE - 1 - r).min(GRID_SIZE - 1 - c)
}

/// Weight of a square by ring; the middle ring counts slightly more.
pub fn ring_weight(pos: usize) -> f64 {
    match ring_of(pos) {
        1 => 1.25,
        _ => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbors_are_symmetric() {
        for (a, ns) in NEIGHBORS.iter().enumerate() {
            for &b in ns.iter() {
                assert!(NEIGHBORS[b].contains(&a), "{a} -> {b} not mirrored");
            }
        }
    }

    #[test]
    fn every_position_sits_on_two_mills() {
        for pos in 0..NUM_POSITIONS {
            assert_eq!(mills_containing(pos).count(), 2);
            assert!(mills_containing(pos).all(|m| m.contains(&pos)));
        }
    }

    #[test]
    fn symmetries_are_permutations_preserving_adjacency() {
        for map in symmetries() {
            let mut seen = [false; NUM_POSITIONS];
            for &m in map.iter() {
                seen[m] = true;
            }
            assert!(seen.iter().all(|&s| s));
            for (a, ns) in NEIGHBORS.iter().enumerate() {
                for &b in ns.iter() {
                    assert!(NEIGHBORS[map[a]].contains(&map[b]));
                }
            }
        }
        assert_eq!(symmetries()[0], core::array::from_fn(|i| i));
    }

    #[test]
    fn rings_split_eight_each() {
        let mut counts = [0usize; 3];
        for pos in 0..NUM_POSITIONS {
            counts[ring_of(pos)] += 1;
        }
        assert_eq!(counts, [8, 8, 8]);
    }
}
