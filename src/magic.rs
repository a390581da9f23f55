//! Magic bitboards for sliding piece attacks
//!
//! Each square maps the relevant blockers of a rook or bishop ray set to a
//! slot in a flat attack table: `((occ & mask) * magic) >> shift`.
//!
//! The known magic numbers below are checked when the tables are built. A
//! number that sends two blocker sets with different attacks to the same slot
//! is replaced by a freshly searched one, drawn from a seeded generator so the
//! tables are identical on every run.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::sync::OnceLock;

// ============================================================================
// MAGIC NUMBERS (from Chess Programming Wiki / Stockfish)
// ============================================================================

/// Rook magic numbers - one per square
/// These are carefully chosen constants that produce perfect hashing
const ROOK_MAGICS: [u64; 64] = [
    0x0080001020400080, 0x0040001000200040, 0x0080081000200080, 0x0080040800100080,
    0x0080020400080080, 0x0080010200040080, 0x0080008001000200, 0x0080002040800100,
    0x0000800020400080, 0x0000400020005000, 0x0000801000200080, 0x0000800800100080,
    0x0000800400080080, 0x0000800200040080, 0x0000800100020080, 0x0000800040800100,
    0x0000208000400080, 0x0000404000201000, 0x0000808010002000, 0x0000808008001000,
    0x0000808004000800, 0x0000808002000400, 0x0000010100020004, 0x0000020000408104,
    0x0000208080004000, 0x0000200040005000, 0x0000100080200080, 0x0000080080100080,
    0x0000040080080080, 0x0000020080040080, 0x0000010080800200, 0x0000800080004100,
    0x0000204000800080, 0x0000200040401000, 0x0000100080802000, 0x0000080080801000,
    0x0000040080800800, 0x0000020080800400, 0x0000020001010004, 0x0000800040800100,
    0x0000204000808000, 0x0000200040008080, 0x0000100020008080, 0x0000080010008080,
    0x0000040008008080, 0x0000020004008080, 0x0000010002008080, 0x0000004081020004,
    0x0000204000800080, 0x0000200040008080, 0x0000100020008080, 0x0000080010008080,
    0x0000040008008080, 0x0000020004008080, 0x0000800100020080, 0x0000800041000080,
    0x00FFFCDDFCED714A, 0x007FFCDDFCED714A, 0x003FFFCDFFD88096, 0x0000040810002101,
    0x0001000204080011, 0x0001000204000801, 0x0001000082000401, 0x0001FFFAABFAD1A2,
];

/// Bishop magic numbers - one per square
const BISHOP_MAGICS: [u64; 64] = [
    0x0002020202020200, 0x0002020202020000, 0x0004010202000000, 0x0004040080000000,
    0x0001104000000000, 0x0000821040000000, 0x0000410410400000, 0x0000104104104000,
    0x0000040404040400, 0x0000020202020200, 0x0000040102020000, 0x0000040400800000,
    0x0000011040000000, 0x0000008210400000, 0x0000004104104000, 0x0000002082082000,
    0x0004000808080800, 0x0002000404040400, 0x0001000202020200, 0x0000800802004000,
    0x0000800400A00000, 0x0000200100884000, 0x0000400082082000, 0x0000200041041000,
    0x0002080010101000, 0x0001040008080800, 0x0000208004010400, 0x0000404004010200,
    0x0000840000802000, 0x0000404002011000, 0x0000808001041000, 0x0000404000820800,
    0x0001041000202000, 0x0000820800101000, 0x0000104400080800, 0x0000020080080080,
    0x0000404040040100, 0x0000808100020100, 0x0001010100020800, 0x0000808080010400,
    0x0000820820004000, 0x0000410410002000, 0x0000082088001000, 0x0000002011000800,
    0x0000080100400400, 0x0001010101000200, 0x0002020202000400, 0x0001010101000200,
    0x0000410410400000, 0x0000208208200000, 0x0000002084100000, 0x0000000020880000,
    0x0000001002020000, 0x0000040408020000, 0x0004040404040000, 0x0002020202020000,
    0x0000104104104000, 0x0000002082082000, 0x0000000020841000, 0x0000000000208800,
    0x0000000010020200, 0x0000000404080200, 0x0000040404040400, 0x0002020202020200,
];

// ============================================================================
// ATTACK TABLES
// ============================================================================

/// Sum of 2^bits over all squares
const ROOK_TABLE_SIZE: usize = 102400;
const BISHOP_TABLE_SIZE: usize = 5248;

/// Seed for the replacement search; the square index is mixed in per square
const MAGIC_SEED: u64 = 0x00C0_FFEE_D00D_F00D;

/// Magic entry for a single square
#[derive(Clone, Copy, Default)]
struct MagicEntry {
    mask: u64,     // Relevant occupancy mask (excludes edges)
    magic: u64,    // Magic number
    shift: u32,    // 64 - popcount(mask)
    offset: usize, // Offset into attack table
}

impl MagicEntry {
    #[inline]
    fn index(&self, occ: u64) -> usize {
        self.offset + ((occ & self.mask).wrapping_mul(self.magic) >> self.shift) as usize
    }
}

struct SliderTable {
    entries: [MagicEntry; 64],
    attacks: Vec<u64>,
    replaced: usize,
}

struct MagicTables {
    rook: SliderTable,
    bishop: SliderTable,
}

static MAGIC_TABLES: OnceLock<MagicTables> = OnceLock::new();

// ============================================================================
// MASK GENERATION (relevant occupancy squares, excluding edges)
// ============================================================================

/// Generate rook mask for a square (relevant blockers, excluding edge squares)
fn rook_mask(sq: usize) -> u64 {
    let mut mask = 0u64;
    let rank = sq / 8;
    let file = sq % 8;
    
    // North (exclude rank 7)
    for r in (rank + 1)..7 {
        mask |= 1u64 << (r * 8 + file);
    }
    // South (exclude rank 0)
    for r in 1..rank {
        mask |= 1u64 << (r * 8 + file);
    }
    // East (exclude file H)
    for f in (file + 1)..7 {
        mask |= 1u64 << (rank * 8 + f);
    }
    // West (exclude file A)
    for f in 1..file {
        mask |= 1u64 << (rank * 8 + f);
    }
    
    mask
}

/// Generate bishop mask for a square
fn bishop_mask(sq: usize) -> u64 {
    let mut mask = 0u64;
    let rank = sq / 8;
    let file = sq % 8;
    
    // NE
    let (mut r, mut f) = (rank + 1, file + 1);
    while r < 7 && f < 7 {
        mask |= 1u64 << (r * 8 + f);
        r += 1;
        f += 1;
    }
    // NW
    let (mut r, mut f) = (rank + 1, file.wrapping_sub(1));
    while r < 7 && f > 0 && f < 8 {
        mask |= 1u64 << (r * 8 + f);
        r += 1;
        f = f.wrapping_sub(1);
    }
    // SE
    let (mut r, mut f) = (rank.wrapping_sub(1), file + 1);
    while r > 0 && r < 8 && f < 7 {
        mask |= 1u64 << (r * 8 + f);
        r = r.wrapping_sub(1);
        f += 1;
    }
    // SW
    let (mut r, mut f) = (rank.wrapping_sub(1), file.wrapping_sub(1));
    while r > 0 && r < 8 && f > 0 && f < 8 {
        mask |= 1u64 << (r * 8 + f);
        r = r.wrapping_sub(1);
        f = f.wrapping_sub(1);
    }
    
    mask
}

// ============================================================================
// ATTACK GENERATION (used to build tables)
// ============================================================================

/// Generate rook attacks for a given square and occupancy (slow, for table building)
fn rook_attacks_slow(sq: usize, occ: u64) -> u64 {
    let mut attacks = 0u64;
    let rank = sq / 8;
    let file = sq % 8;
    
    // North
    for r in (rank + 1)..8 {
        let bit = 1u64 << (r * 8 + file);
        attacks |= bit;
        if occ & bit != 0 { break; }
    }
    // South
    for r in (0..rank).rev() {
        let bit = 1u64 << (r * 8 + file);
        attacks |= bit;
        if occ & bit != 0 { break; }
    }
    // East
    for f in (file + 1)..8 {
        let bit = 1u64 << (rank * 8 + f);
        attacks |= bit;
        if occ & bit != 0 { break; }
    }
    // West
    for f in (0..file).rev() {
        let bit = 1u64 << (rank * 8 + f);
        attacks |= bit;
        if occ & bit != 0 { break; }
    }
    
    attacks
}

/// Generate bishop attacks for a given square and occupancy (slow, for table building)
fn bishop_attacks_slow(sq: usize, occ: u64) -> u64 {
    let mut attacks = 0u64;
    let rank = sq / 8;
    let file = sq % 8;
    
    // NE
    let (mut r, mut f) = (rank + 1, file + 1);
    while r < 8 && f < 8 {
        let bit = 1u64 << (r * 8 + f);
        attacks |= bit;
        if occ & bit != 0 { break; }
        r += 1;
        f += 1;
    }
    // NW
    let (mut r, mut f) = (rank + 1, file.wrapping_sub(1));
    while r < 8 && f < 8 {
        let bit = 1u64 << (r * 8 + f);
        attacks |= bit;
        if occ & bit != 0 { break; }
        r += 1;
        f = f.wrapping_sub(1);
    }
    // SE
    let (mut r, mut f) = (rank.wrapping_sub(1), file + 1);
    while r < 8 && f < 8 {
        let bit = 1u64 << (r * 8 + f);
        attacks |= bit;
        if occ & bit != 0 { break; }
        r = r.wrapping_sub(1);
        f += 1;
    }
    // SW
    let (mut r, mut f) = (rank.wrapping_sub(1), file.wrapping_sub(1));
    while r < 8 && f < 8 {
        let bit = 1u64 << (r * 8 + f);
        attacks |= bit;
        if occ & bit != 0 { break; }
        r = r.wrapping_sub(1);
        f = f.wrapping_sub(1);
    }
    
    attacks
}

// ============================================================================
// TABLE INITIALIZATION
// ============================================================================

/// Generate all blocker subsets for a given mask (Carry-Rippler)
fn enumerate_subsets(mask: u64) -> Vec<u64> {
    let mut subsets = Vec::with_capacity(1 << mask.count_ones());
    let mut subset = 0u64;
    loop {
        subsets.push(subset);
        subset = subset.wrapping_sub(mask) & mask;
        if subset == 0 {
            break;
        }
    }
    subsets
}

/// Place every (blocker set, attacks) pair for `magic` into `slots`.
/// Returns false on a destructive collision.
fn try_magic(
    magic: u64,
    shift: u32,
    blockers: &[u64],
    attacks: &[u64],
    slots: &mut [Option<u64>],
) -> bool {
    slots.iter_mut().for_each(|s| *s = None);
    for (&occ, &atk) in blockers.iter().zip(attacks) {
        let idx = (occ.wrapping_mul(magic) >> shift) as usize;
        match slots[idx] {
            None => slots[idx] = Some(atk),
            Some(existing) if existing == atk => {}
            Some(_) => return false,
        }
    }
    true
}

fn find_magic(
    mask: u64,
    shift: u32,
    blockers: &[u64],
    attacks: &[u64],
    slots: &mut [Option<u64>],
    rng: &mut SmallRng,
) -> u64 {
    loop {
        // Sparse candidates hash far better
        let magic = rng.gen::<u64>() & rng.gen::<u64>() & rng.gen::<u64>();
        if (mask.wrapping_mul(magic) & 0xFF00_0000_0000_0000).count_ones() < 6 {
            continue;
        }
        if try_magic(magic, shift, blockers, attacks, slots) {
            return magic;
        }
    }
}

fn build_slider_table(
    known: &[u64; 64],
    mask_of: fn(usize) -> u64,
    attacks_of: fn(usize, u64) -> u64,
    capacity: usize,
    seed: u64,
) -> SliderTable {
    let mut entries = [MagicEntry::default(); 64];
    let mut table = Vec::with_capacity(capacity);
    let mut replaced = 0;

    for (sq, entry) in entries.iter_mut().enumerate() {
        let mask = mask_of(sq);
        let shift = 64 - mask.count_ones();
        let blockers = enumerate_subsets(mask);
        let attacks: Vec<u64> = blockers.iter().map(|&occ| attacks_of(sq, occ)).collect();
        let mut slots = vec![None; 1 << mask.count_ones()];

        let magic = if try_magic(known[sq], shift, &blockers, &attacks, &mut slots) {
            known[sq]
        } else {
            replaced += 1;
            let mut rng = SmallRng::seed_from_u64(seed ^ sq as u64);
            find_magic(mask, shift, &blockers, &attacks, &mut slots, &mut rng)
        };

        *entry = MagicEntry {
            mask,
            magic,
            shift,
            offset: table.len(),
        };
        // Slots never reached by a blocker subset stay empty
        table.extend(slots.iter().map(|s| s.unwrap_or(0)));
    }

    debug_assert_eq!(table.len(), capacity);
    SliderTable {
        entries,
        attacks: table,
        replaced,
    }
}

fn init_magic_tables() -> MagicTables {
    let rook = build_slider_table(
        &ROOK_MAGICS,
        rook_mask,
        rook_attacks_slow,
        ROOK_TABLE_SIZE,
        MAGIC_SEED,
    );
    let bishop = build_slider_table(
        &BISHOP_MAGICS,
        bishop_mask,
        bishop_attacks_slow,
        BISHOP_TABLE_SIZE,
        MAGIC_SEED.rotate_left(32),
    );
    if rook.replaced + bishop.replaced > 0 {
        log::debug!(
            "magic tables: replaced {} rook and {} bishop magics",
            rook.replaced,
            bishop.replaced
        );
    }
    MagicTables { rook, bishop }
}

#[inline]
fn tables() -> &'static MagicTables {
    MAGIC_TABLES.get_or_init(init_magic_tables)
}

/// Build the tables now rather than on first lookup
pub fn init() {
    tables();
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Rook attacks from `sq` given board occupancy
#[inline]
pub fn rook_attacks(sq: usize, occ: u64) -> u64 {
    let t = &tables().rook;
    t.attacks[t.entries[sq].index(occ)]
}

/// Bishop attacks from `sq` given board occupancy
#[inline]
pub fn bishop_attacks(sq: usize, occ: u64) -> u64 {
    let t = &tables().bishop;
    t.attacks[t.entries[sq].index(occ)]
}

#[inline]
pub fn queen_attacks(sq: usize, occ: u64) -> u64 {
    rook_attacks(sq, occ) | bishop_attacks(sq, occ)
}
