/// Occupancy of a fixed set of sites.
///
/// Keeps the number of occupied sites alongside the indicator vector so both
/// point updates and the occupied count are O(1).
#[derive(Debug, Clone, PartialEq)]
pub struct Lattice {
    occ: Vec<bool>,
    n_occ: usize,
}

impl Lattice {
    /// Create a lattice from a copy of an occupancy vector.
    pub fn new(occ: &[bool]) -> Self {
        let n_occ = occ.iter().filter(|&&is_occ| is_occ).count();
        Self {
            occ: occ.to_vec(),
            n_occ,
        }
    }

    pub fn n_sites(&self) -> usize {
        self.occ.len()
    }

    pub fn n_occupied(&self) -> usize {
        self.n_occ
    }

    pub fn is_free(&self, site: usize) -> bool {
        !self.occ[site]
    }

    pub fn set_occupied(&mut self, site: usize) {
        if !self.occ[site] {
            self.occ[site] = true;
            self.n_occ += 1;
        }
    }

    pub fn set_free(&mut self, site: usize) {
        if self.occ[site] {
            self.occ[site] = false;
            self.n_occ -= 1;
        }
    }

    /// Indices of free sites in ascending order.
    pub fn free_sites(&self) -> impl Iterator<Item = usize> + '_ {
        self.occ
            .iter()
            .enumerate()
            .filter_map(|(site, &is_occ)| (!is_occ).then_some(site))
    }

    /// Indices of occupied sites in ascending order.
    pub fn occupied_sites(&self) -> impl Iterator<Item = usize> + '_ {
        self.occ
            .iter()
            .enumerate()
            .filter_map(|(site, &is_occ)| is_occ.then_some(site))
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.occ
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_occupied_count() {
        let mut lattice = Lattice::new(&[true, false, true, false]);
        assert_eq!(lattice.n_sites(), 4);
        assert_eq!(lattice.n_occupied(), 2);

        lattice.set_occupied(1);
        lattice.set_occupied(1);
        assert_eq!(lattice.n_occupied(), 3);

        lattice.set_free(0);
        lattice.set_free(0);
        assert_eq!(lattice.n_occupied(), 2);
        assert!(lattice.is_free(0));
        assert!(!lattice.is_free(1));
    }

    #[test]
    fn enumerates_sites() {
        let lattice = Lattice::new(&[true, false, true, false]);
        assert_eq!(lattice.free_sites().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(lattice.occupied_sites().collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn copies_caller_vector() {
        let init = vec![false, true];
        let mut lattice = Lattice::new(&init);
        lattice.set_free(1);
        assert_eq!(init, vec![false, true]);
        assert_eq!(lattice.as_slice(), &[false, false]);
    }
}
