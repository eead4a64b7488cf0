/// What happens to a rule once it matched a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Consumption {
    /// Retired from the active set until re-armed.
    Once,
    Repeat,
    /// Switches the decoder to the remarks grammar for the rest of the report.
    EnterRemarks,
    /// Opens a METAR trend sub-record.
    OpenTrend,
    /// Opens a TAF `FM` period.
    OpenPeriod,
    /// Opens a TAF change group.
    OpenChange,
}

pub(crate) trait GrammarRule: Copy + PartialEq + 'static {
    fn consumption(self) -> Consumption;
}

/// Per-decode view of a static rule table, in priority order.
///
/// Retiring a rule flips a bit in a private mask, so the shared table is never touched.
#[derive(Debug, Clone)]
pub(crate) struct ActiveRules<R: 'static> {
    order: &'static [R],
    retired: u64,
}

impl<R: GrammarRule> ActiveRules<R> {
    pub(crate) fn new(order: &'static [R]) -> Self {
        debug_assert!(order.len() <= 64);
        ActiveRules { order, retired: 0 }
    }

    fn bit(&self, rule: R) -> Option<u64> {
        self.order.iter().position(|r| *r == rule).map(|i| 1u64 << i)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = R> + '_ {
        self.order
            .iter()
            .enumerate()
            .filter(move |(i, _)| self.retired & (1u64 << i) == 0)
            .map(|(_, rule)| *rule)
    }

    /// Applies the rule's consumption policy after it matched.
    pub(crate) fn matched(&mut self, rule: R) {
        if rule.consumption() == Consumption::Once {
            if let Some(bit) = self.bit(rule) {
                self.retired |= bit;
            }
        }
    }

    pub(crate) fn rearm(&mut self, rules: &[R]) {
        for rule in rules {
            if let Some(bit) = self.bit(*rule) {
                self.retired &= !bit;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Toy {
        First,
        Many,
        Last,
    }

    impl GrammarRule for Toy {
        fn consumption(self) -> Consumption {
            match self {
                Toy::Many => Consumption::Repeat,
                _ => Consumption::Once,
            }
        }
    }

    static TOY_RULES: [Toy; 3] = [Toy::First, Toy::Many, Toy::Last];

    #[test]
    fn once_rules_retire_and_rearm() {
        let mut rules = ActiveRules::new(&TOY_RULES);
        rules.matched(Toy::First);
        rules.matched(Toy::Many);
        assert_eq!(rules.iter().collect::<Vec<_>>(), [Toy::Many, Toy::Last]);
        assert!(!rules.iter().any(|r| r == Toy::First));

        rules.rearm(&[Toy::First]);
        assert_eq!(rules.iter().collect::<Vec<_>>(), TOY_RULES);
    }

    #[test]
    fn copies_are_independent() {
        let mut a = ActiveRules::new(&TOY_RULES);
        let b = a.clone();
        a.matched(Toy::Last);
        assert!(!a.iter().any(|r| r == Toy::Last));
        assert!(b.iter().any(|r| r == Toy::Last));
    }
}
