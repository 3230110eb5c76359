//! Canned persona answers used when the remote model is unavailable.

use rand::Rng;

/// The five complete answers the service can return without the remote
/// model. Each is independently valid and already signed.
pub const FALLBACK_RESPONSES: [&str; 5] = [
    "The purpose of life according to the Bhagavad Gita is to realize your true self and fulfill your dharma (duty). When you act with detachment from the fruits of your actions and with devotion to the divine, you achieve liberation from the cycle of birth and death. As I said in Chapter 2, verse 47: 'You have a right to perform your prescribed duties, but you are not entitled to the fruits of your actions.' Find joy in the journey, not just the destination. - Lord Krishna",
    "Arjuna, remember that true happiness comes from within. In the Gita, I teach that one who has controlled the mind finds peace within - not in external objects or achievements. Cultivate inner stillness through meditation, devotion, and selfless service. As I state in Chapter 6, verse 7: 'For one who has conquered the mind, the mind is the best of friends; but for one who has failed to do so, the mind will remain the greatest enemy.' - Lord Krishna",
    "My dear friend, the path of dharma (righteousness) is not always easy, but it is always rewarding. When you align your actions with cosmic law and perform your duties without attachment to results, you honor the divine order. As I explained in the Gita, 'It is better to perform one's own duties imperfectly than to master the duties of another.' (18.47) Find your unique purpose and fulfill it with devotion. - Lord Krishna",
    "The mind can be your greatest ally or your worst enemy. Practice discipline through yoga and meditation to bring it under control. As I teach in the Bhagavad Gita, 'For him who has conquered the mind, the mind is the best of friends; but for one who has failed to do so, his very mind will be the greatest enemy.' (Chapter 6, Verse 6) With a disciplined mind, you'll find peace even amidst life's storms. - Lord Krishna",
    "Remember that your true self - the atman - is eternal and unchanging. As I revealed to Arjuna, 'For the soul there is neither birth nor death at any time. He has not come into being, does not come into being, and will not come into being. He is unborn, eternal, ever-existing, and primeval.' (Chapter 2, Verse 20) Realize this truth, and you will be free from fear and attachment. - Lord Krishna",
];

/// Read-only pool of canned answers with uniform-random selection.
///
/// The RNG is supplied by the caller so tests can seed it and assert
/// exact content.
#[derive(Debug, Clone, Copy)]
pub struct FallbackPool {
    responses: &'static [&'static str],
}

impl FallbackPool {
    pub fn new() -> Self {
        Self {
            responses: &FALLBACK_RESPONSES,
        }
    }

    pub fn choose<R: Rng>(&self, rng: &mut R) -> &'static str {
        self.responses[rng.gen_range(0..self.responses.len())]
    }

    pub fn contains(&self, text: &str) -> bool {
        self.responses.iter().any(|r| *r == text)
    }
}

impl Default for FallbackPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn choose_is_deterministic_with_seeded_rng() {
        let pool = FallbackPool::new();
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        assert_eq!(pool.choose(&mut a), pool.choose(&mut b));
    }

    #[test]
    fn choose_always_returns_a_pool_member() {
        let pool = FallbackPool::new();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            assert!(pool.contains(pool.choose(&mut rng)));
        }
    }

    #[test]
    fn every_response_is_reachable() {
        let pool = FallbackPool::new();
        let mut rng = StdRng::seed_from_u64(1);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            seen.insert(pool.choose(&mut rng));
        }
        assert_eq!(seen.len(), FALLBACK_RESPONSES.len());
    }

    #[test]
    fn every_response_carries_the_signature() {
        for response in FALLBACK_RESPONSES {
            assert!(response.trim_end().ends_with("Lord Krishna"));
        }
    }
}
