use crate::dwell::DwellPolicy;
use crate::lattice::Lattice;
use rand::Rng;

/// Searcher bound to one site.
///
/// `deadline` is the absolute step after which the searcher may jump again.
#[derive(Debug, Clone, PartialEq)]
pub struct Searcher {
    idx: usize,
    site: usize,
    deadline: f64,
}

impl Searcher {
    pub fn idx(&self) -> usize {
        self.idx
    }

    pub fn site(&self) -> usize {
        self.site
    }

    pub fn deadline(&self) -> f64 {
        self.deadline
    }
}

/// Registry of all searchers of a run.
///
/// Owns the canonical searcher records together with the lattice and a
/// site-to-searcher index; every relocation updates the three at once.
/// Iteration order is assignment order, i.e. ascending initial site.
#[derive(Debug, Clone)]
pub struct Registry {
    searchers: Vec<Searcher>,
    lattice: Lattice,
    owner: Vec<Option<usize>>,
}

impl Registry {
    /// Place one searcher on each occupied site of `init_occ`.
    ///
    /// Initial deadlines are plain dwell draws measured from step 0.
    pub fn new<R: Rng + ?Sized>(init_occ: &[bool], dwell: &DwellPolicy, rng: &mut R) -> Self {
        let lattice = Lattice::new(init_occ);
        let mut owner = vec![None; lattice.n_sites()];
        let mut searchers = Vec::with_capacity(lattice.n_occupied());
        for (idx, site) in lattice.occupied_sites().enumerate() {
            let deadline = dwell.draw(site, rng);
            owner[site] = Some(idx);
            searchers.push(Searcher {
                idx,
                site,
                deadline,
            });
        }
        Self {
            searchers,
            lattice,
            owner,
        }
    }

    pub fn len(&self) -> usize {
        self.searchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.searchers.is_empty()
    }

    pub fn searcher(&self, idx: usize) -> &Searcher {
        &self.searchers[idx]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Searcher> {
        self.searchers.iter()
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// Searcher currently sitting on `site`, if any.
    pub fn owner(&self, site: usize) -> Option<usize> {
        self.owner[site]
    }

    /// Move searcher `idx` to the free site `dest`.
    pub fn relocate(&mut self, idx: usize, dest: usize) {
        debug_assert!(self.lattice.is_free(dest), "site {dest} is already occupied");
        let origin = self.searchers[idx].site;
        self.lattice.set_free(origin);
        self.owner[origin] = None;
        self.lattice.set_occupied(dest);
        self.owner[dest] = Some(idx);
        self.searchers[idx].site = dest;
    }

    pub fn set_deadline(&mut self, idx: usize, deadline: f64) {
        self.searchers[idx].deadline = deadline;
    }

    pub fn into_lattice(self) -> Lattice {
        self.lattice
    }
}
