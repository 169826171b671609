use super::Phenotype;
use crate::merit::MeritModel;
use crate::policy::ApplyEnergyMethod;

impl Phenotype {
    /// Sets the energy store, clamped to `[0, energy_cap]`.
    pub fn set_energy(&mut self, value: f64) {
        self.energy_store = value.min(self.settings.energy_cap).max(0.0);
    }

    pub fn reduce_energy(&mut self, cost: f64) {
        self.set_energy(self.energy_store - cost);
    }

    /// Moves the energy bonus earned so far either straight into the store
    /// or into the deferred buffer, depending on when energy is applied.
    pub fn refresh_energy(&mut self) {
        let bonus = self.cur.energy_bonus;
        if bonus > 0.0 {
            match self.settings.apply_energy_method {
                ApplyEnergyMethod::OnDivide | ApplyEnergyMethod::OnSleep => {
                    self.energy_to_be_applied += bonus;
                }
                ApplyEnergyMethod::OnTaskCompletion => {
                    self.set_energy(self.energy_store + bonus);
                }
            }
        }
        self.cur.energy_bonus = 0.0;
    }

    /// Flushes the deferred buffer into the store.
    pub fn apply_to_energy_store(&mut self) {
        self.set_energy(self.energy_store + self.energy_to_be_applied);
        self.energy_to_be_applied = 0.0;
    }

    /// Splits the parent's energy at birth and returns the offspring's share.
    ///
    /// The parent's store decays by the configured fraction, the child gets
    /// `min(store * give_fraction + birth_grant, cap)`, and the parent pays
    /// `child - 2 * birth_grant` (one grant is the child's, one the
    /// parent's). The parent's merit is then re-derived from what is left.
    ///
    /// # Panics
    /// If energy accounting is disabled.
    pub fn extract_parent_energy(&mut self) -> f64 {
        assert!(
            self.settings.energy_enabled,
            "energy extraction with energy accounting disabled"
        );

        if self.settings.apply_energy_method == ApplyEnergyMethod::OnDivide {
            self.refresh_energy();
            self.apply_to_energy_store();
        }

        let s = &self.settings;
        let grant = s.energy_given_at_birth;
        let give_frac = s.frac_parent_energy_given_at_birth;
        let decay_frac = s.frac_energy_decay_at_birth;
        let cap = s.energy_cap;

        self.reduce_energy(self.energy_store * decay_frac);

        let child_energy = (self.energy_store * give_frac + grant).min(cap);
        self.reduce_energy(child_energy - 2.0 * grant);

        let model = MeritModel::new(&self.settings);
        self.merit = model.energy_to_merit(self.energy_store) * self.execution_ratio;

        child_energy
    }

    #[inline(always)]
    pub fn energy_store(&self) -> f64 {
        self.energy_store
    }

    #[inline(always)]
    pub fn energy_to_be_applied(&self) -> f64 {
        self.energy_to_be_applied
    }

    #[inline(always)]
    pub fn execution_ratio(&self) -> f64 {
        self.execution_ratio
    }

    pub fn set_execution_ratio(&mut self, ratio: f64) {
        self.execution_ratio = ratio;
    }
}
