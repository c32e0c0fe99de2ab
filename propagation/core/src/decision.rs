use crate::{annotations::Directives, exclusion::Exclusions, Error};
use hnc_propagation_k8s_api::{Labels, Object};
use std::ops::ControlFlow;
use tracing::{debug, trace};

/// One link of the propagation precedence chain.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// A plain selector that does not match the namespace blocks propagation.
    Selector,

    /// A tree selector that does not match the namespace blocks propagation.
    TreeSelector,

    /// A true `none` flag blocks propagation.
    None,

    /// A true `all` flag forces propagation, bypassing exclusions.
    All,

    /// An exclusion rule blocks propagation.
    Exclusions,
}

/// Decides whether objects are propagated into descendant namespaces.
#[derive(Clone, Debug, Default)]
pub struct Propagation {
    exclusions: Exclusions,
}

// === impl Step ===

impl Step {
    /// The order in which steps are evaluated. The first step to break decides.
    pub const CHAIN: [Step; 5] = [
        Step::Selector,
        Step::TreeSelector,
        Step::None,
        Step::All,
        Step::Exclusions,
    ];

    /// Evaluates this step of [`Propagation::should_propagate`], breaking with
    /// a verdict if the step is decisive.
    pub fn decide(
        self,
        directives: &Directives<'_>,
        obj: &Object,
        ns_labels: &Labels,
        exclusions: &Exclusions,
    ) -> Result<ControlFlow<bool>, Error> {
        let verdict = match self {
            Self::Selector => (!directives.selector()?.matches(ns_labels)).then_some(false),
            Self::TreeSelector => match directives.tree_selector()? {
                Some(tree) if !tree.matches(ns_labels) => Some(false),
                _ => None,
            },
            Self::None => directives.none()?.then_some(false),
            Self::All => directives.all()?.then_some(true),
            Self::Exclusions => exclusions.is_excluded(obj)?.then_some(false),
        };

        Ok(match verdict {
            Some(verdict) => ControlFlow::Break(verdict),
            None => ControlFlow::Continue(()),
        })
    }

    /// Returns true if this step's directive is set on the object. Exclusions
    /// are not directives and never count.
    pub fn is_set(self, directives: &Directives<'_>) -> Result<bool, Error> {
        match self {
            Self::Selector => Ok(!directives.selector()?.is_empty()),
            Self::TreeSelector => Ok(directives
                .tree_selector()?
                .is_some_and(|tree| !tree.selector().is_empty())),
            Self::None => directives.none(),
            Self::All => directives.all(),
            Self::Exclusions => Ok(false),
        }
    }
}

// === impl Propagation ===

impl Propagation {
    pub fn new(exclusions: Exclusions) -> Self {
        Self { exclusions }
    }

    pub fn exclusions(&self) -> &Exclusions {
        &self.exclusions
    }

    /// Returns true if `obj` carries any propagation directive.
    ///
    /// The namespace labels do not affect the answer.
    pub fn selector_exists(&self, obj: &Object, _ns_labels: &Labels) -> Result<bool, Error> {
        let directives = Directives::read(obj);
        for step in Step::CHAIN {
            if step.is_set(&directives)? {
                trace!(?step, name = %obj.name(), "Selector exists");
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Returns true if `obj` should be propagated into the namespace with
    /// `ns_labels`.
    ///
    /// Each step parses its own annotation when it is reached, so a malformed
    /// annotation is reported unless an earlier step has already decided.
    pub fn should_propagate(&self, obj: &Object, ns_labels: &Labels) -> Result<bool, Error> {
        let directives = Directives::read(obj);
        for step in Step::CHAIN {
            if let ControlFlow::Break(verdict) =
                step.decide(&directives, obj, ns_labels, &self.exclusions)?
            {
                debug!(?step, verdict, kind = %obj.kind(), name = %obj.name(), "Decided");
                return Ok(verdict);
            }
        }

        debug!(kind = %obj.kind(), name = %obj.name(), "Propagating by default");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::{ALL_SELECTOR, NONE_SELECTOR, SELECTOR, TREE_SELECTOR};
    use hnc_propagation_k8s_api::ConfigMap;
    use maplit::btreemap;

    fn secret() -> Object {
        Object::new("", "Secret", "creds")
    }

    fn decide(step: Step, obj: &Object, ns_labels: &Labels) -> ControlFlow<bool> {
        step.decide(
            &Directives::read(obj),
            obj,
            ns_labels,
            &Exclusions::default(),
        )
        .expect("step must not fail")
    }

    #[test]
    fn chain_order() {
        assert_eq!(
            Step::CHAIN,
            [
                Step::Selector,
                Step::TreeSelector,
                Step::None,
                Step::All,
                Step::Exclusions
            ]
        );
    }

    #[test]
    fn selector_step() {
        let obj = secret().with_annotation(SELECTOR, "env=prod");
        let prod = Labels::from(btreemap! { "env".to_string() => "prod".to_string() });
        assert_eq!(
            decide(Step::Selector, &obj, &prod),
            ControlFlow::Continue(())
        );
        assert_eq!(
            decide(Step::Selector, &obj, &Labels::default()),
            ControlFlow::Break(false)
        );
        assert_eq!(
            decide(Step::Selector, &secret(), &Labels::default()),
            ControlFlow::Continue(())
        );
    }

    #[test]
    fn tree_selector_step() {
        let obj = secret().with_annotation(TREE_SELECTOR, "team-a");
        let child = Labels::from(btreemap! {
            "team-a.tree.hnc.x-k8s.io/depth".to_string() => "1".to_string(),
        });
        assert_eq!(
            decide(Step::TreeSelector, &obj, &child),
            ControlFlow::Continue(())
        );
        assert_eq!(
            decide(Step::TreeSelector, &obj, &Labels::default()),
            ControlFlow::Break(false)
        );
    }

    #[test]
    fn flag_steps() {
        let none = secret().with_annotation(NONE_SELECTOR, "true");
        assert_eq!(
            decide(Step::None, &none, &Labels::default()),
            ControlFlow::Break(false)
        );
        assert_eq!(
            decide(Step::All, &none, &Labels::default()),
            ControlFlow::Continue(())
        );

        let all = secret().with_annotation(ALL_SELECTOR, "1");
        assert_eq!(
            decide(Step::All, &all, &Labels::default()),
            ControlFlow::Break(true)
        );
        assert_eq!(
            decide(Step::None, &all, &Labels::default()),
            ControlFlow::Continue(())
        );
    }

    #[test]
    fn exclusions_step() {
        let cm = Object::of::<ConfigMap>("kube-root-ca.crt");
        assert_eq!(
            decide(Step::Exclusions, &cm, &Labels::default()),
            ControlFlow::Break(false)
        );
        assert_eq!(
            decide(Step::Exclusions, &secret(), &Labels::default()),
            ControlFlow::Continue(())
        );
    }

    #[test]
    fn step_errors_are_returned() {
        let obj = secret().with_annotation(NONE_SELECTOR, "maybe");
        let err = Step::None
            .decide(
                &Directives::read(&obj),
                &obj,
                &Labels::default(),
                &Exclusions::default(),
            )
            .unwrap_err();
        assert_eq!(err.annotation(), NONE_SELECTOR);
    }

    #[test]
    fn earlier_steps_short_circuit_later_errors() {
        let obj = secret()
            .with_annotation(SELECTOR, "env=prod")
            .with_annotation(NONE_SELECTOR, "maybe");
        let propagation = Propagation::default();
        assert_eq!(
            propagation.should_propagate(&obj, &Labels::default()),
            Ok(false)
        );

        let prod = Labels::from(btreemap! { "env".to_string() => "prod".to_string() });
        assert!(propagation.should_propagate(&obj, &prod).is_err());
    }

    #[test]
    fn custom_exclusions() {
        let cm = Object::of::<ConfigMap>("kube-root-ca.crt");
        let propagation = Propagation::new(Exclusions::none());
        assert_eq!(propagation.should_propagate(&cm, &Labels::default()), Ok(true));
        assert!(propagation.exclusions().rules().is_empty());
    }
}
