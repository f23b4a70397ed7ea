use rand::{seq::SliceRandom, Rng};

use crate::storage::traits::{Gender, NewPatient};

const FIRST_NAMES: &[&str] = &[
    "Anna", "Bram", "Chloe", "Daan", "Emma", "Finn", "Greta", "Hugo", "Iris", "Jens", "Lotte",
    "Milan", "Noor", "Olaf", "Pien", "Ruben", "Sara", "Thijs", "Vera", "Wout",
];

const LAST_NAMES: &[&str] = &[
    "Bakker", "de Boer", "Dekker", "Hendriks", "Jansen", "de Jong", "Kok", "Meijer", "Mulder",
    "Peters", "de Vries", "Visser", "van Dijk", "van den Berg", "Smit", "Willems",
];

/// Random but plausible patient. A gender is picked from `genders` when
/// it is non-empty.
pub fn random_patient<R: Rng>(rng: &mut R, genders: &[Gender]) -> NewPatient {
    let first_name = FIRST_NAMES.choose(rng).copied().unwrap_or("Anna");
    let last_name = LAST_NAMES.choose(rng).copied().unwrap_or("Jansen");
    let ssn = format!(
        "{:03}-{:02}-{:04}",
        rng.gen_range(1..900),
        rng.gen_range(1..100),
        rng.gen_range(1..10_000)
    );

    NewPatient {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        ssn: Some(ssn),
        contacted: rng.gen_bool(0.5),
        gender_id: genders.choose(rng).map(|g| g.id),
    }
}

pub fn random_patients<R: Rng>(
    rng: &mut R,
    genders: &[Gender],
    count: usize,
) -> Vec<NewPatient> {
    (0..count).map(|_| random_patient(rng, genders)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn genders() -> Vec<Gender> {
        vec![
            Gender {
                id: 1,
                name: "Female".into(),
            },
            Gender {
                id: 2,
                name: "Male".into(),
            },
        ]
    }

    #[test]
    fn random_patients_draw_from_pools() {
        let mut rng = StdRng::seed_from_u64(7);
        let patients = random_patients(&mut rng, &genders(), 50);

        assert_eq!(patients.len(), 50);
        for p in &patients {
            assert!(FIRST_NAMES.contains(&p.first_name.as_str()));
            assert!(LAST_NAMES.contains(&p.last_name.as_str()));
            assert!(matches!(p.gender_id, Some(1) | Some(2)));
            assert_eq!(p.ssn.as_deref().map(str::len), Some(11));
        }
        assert!(patients.iter().any(|p| p.contacted));
        assert!(patients.iter().any(|p| !p.contacted));
    }

    #[test]
    fn random_patient_without_genders_leaves_gender_unset() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(random_patient(&mut rng, &[]).gender_id, None);
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let a = random_patients(&mut StdRng::seed_from_u64(99), &genders(), 5);
        let b = random_patients(&mut StdRng::seed_from_u64(99), &genders(), 5);
        assert_eq!(a, b);
    }
}
