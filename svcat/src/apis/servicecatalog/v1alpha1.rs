//! Resources of the `servicecatalog.k8s.io/v1alpha1` API group version.
//!
//! Brokers are cluster scoped, everything else lives in a namespace.
use k8s_openapi::{
    api::core::v1::{LocalObjectReference, ObjectReference},
    apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time},
    ClusterResourceScope, NamespaceResourceScope,
};
use kube::core::{
    metadata::TypeMeta,
    object::{HasSpec, HasStatus, ObjectList},
};
use serde::{Deserialize, Serialize};

/// API group of the service catalog
pub const GROUP: &str = super::GROUP_NAME;
/// Version served by this module
pub const VERSION: &str = "v1alpha1";
/// `apiVersion` of every resource in this module
pub const API_VERSION: &str = "servicecatalog.k8s.io/v1alpha1";

fn type_meta(kind: &str) -> TypeMeta {
    TypeMeta {
        api_version: API_VERSION.to_string(),
        kind: kind.to_string(),
    }
}

// The `kube::Resource` impl comes from the blanket impl over these two traits
macro_rules! impl_resource {
    ($ty:ident, $scope:ty, $kind:literal, $plural:literal) => {
        impl k8s_openapi::Resource for $ty {
            type Scope = $scope;

            const API_VERSION: &'static str = API_VERSION;
            const GROUP: &'static str = GROUP;
            const KIND: &'static str = $kind;
            const URL_PATH_SEGMENT: &'static str = $plural;
            const VERSION: &'static str = VERSION;
        }

        impl k8s_openapi::Metadata for $ty {
            type Ty = ObjectMeta;

            fn metadata(&self) -> &ObjectMeta {
                &self.metadata
            }

            fn metadata_mut(&mut self) -> &mut ObjectMeta {
                &mut self.metadata
            }
        }
    };
    ($ty:ident, $scope:ty, $kind:literal, $plural:literal, $spec:ty, $status:ty) => {
        impl_resource!($ty, $scope, $kind, $plural);

        impl $ty {
            #[doc = concat!("A new named `", $kind, "` with type information filled in")]
            pub fn new(name: &str, spec: $spec) -> Self {
                Self {
                    types: Some(type_meta($kind)),
                    metadata: ObjectMeta {
                        name: Some(name.to_string()),
                        ..ObjectMeta::default()
                    },
                    spec,
                    status: None,
                }
            }
        }

        impl HasSpec for $ty {
            type Spec = $spec;

            fn spec(&self) -> &$spec {
                &self.spec
            }

            fn spec_mut(&mut self) -> &mut $spec {
                &mut self.spec
            }
        }

        impl HasStatus for $ty {
            type Status = $status;

            fn status(&self) -> Option<&$status> {
                self.status.as_ref()
            }

            fn status_mut(&mut self) -> &mut Option<$status> {
                &mut self.status
            }
        }
    };
}

// ----------------------------------------------------------------------------
// Conditions
// ----------------------------------------------------------------------------

/// Whether a condition holds
///
/// Values the client does not know decode as [`ConditionStatus::Unknown`].
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConditionStatus {
    /// The condition holds
    True,
    /// The condition does not hold
    False,
    /// The controller could not tell
    #[default]
    #[serde(other)]
    Unknown,
}

/// Condition type set once a resource is usable
pub const CONDITION_READY: &str = "Ready";

/// A condition reported on the status of brokers, instances and bindings
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Kind of the condition, such as [`CONDITION_READY`]
    ///
    /// Kept as a string so that types added by newer controllers still decode.
    #[serde(rename = "type")]
    pub type_: String,
    /// Whether the condition holds
    #[serde(default)]
    pub status: ConditionStatus,
    /// Last time the status flipped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<Time>,
    /// One word, CamelCase reason for the last transition
    #[serde(default)]
    pub reason: String,
    /// Human readable details about the last transition
    #[serde(default)]
    pub message: String,
}

impl Condition {
    /// A `Ready` condition with the given status
    pub fn ready(status: ConditionStatus) -> Self {
        Self {
            type_: CONDITION_READY.to_string(),
            status,
            ..Self::default()
        }
    }
}

/// Condition on a [`Broker`]
pub type BrokerCondition = Condition;
/// Condition on an [`Instance`]
pub type InstanceCondition = Condition;
/// Condition on a [`Binding`]
pub type BindingCondition = Condition;

fn is_ready(conditions: &[Condition]) -> bool {
    conditions
        .iter()
        .any(|c| c.type_ == CONDITION_READY && c.status == ConditionStatus::True)
}

// ----------------------------------------------------------------------------
// Broker
// ----------------------------------------------------------------------------

/// An entity that offers services through the Open Service Broker API
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct Broker {
    /// Type information
    #[serde(flatten, default, skip_serializing_if = "Option::is_none")]
    pub types: Option<TypeMeta>,
    /// Standard object metadata
    #[serde(default)]
    pub metadata: ObjectMeta,
    /// Desired state
    pub spec: BrokerSpec,
    /// Observed state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<BrokerStatus>,
}

/// Where to find a broker, and how to talk to it
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BrokerSpec {
    /// Address of the broker endpoint
    pub url: String,
    /// Secret holding the credentials for the broker endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_secret: Option<ObjectReference>,
}

/// Observed state of a [`Broker`]
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BrokerStatus {
    /// Latest observations
    #[serde(default)]
    pub conditions: Vec<BrokerCondition>,
}

impl BrokerStatus {
    /// Whether the broker catalog has been fetched successfully
    pub fn is_ready(&self) -> bool {
        is_ready(&self.conditions)
    }
}

impl_resource!(Broker, ClusterResourceScope, "Broker", "brokers", BrokerSpec, BrokerStatus);

// ----------------------------------------------------------------------------
// ServiceClass
// ----------------------------------------------------------------------------

/// A service offered by a broker, along with its plans
///
/// Classes are written by the catalog controller from the broker catalog,
/// so there is no spec/status split.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceClass {
    /// Type information
    #[serde(flatten, default, skip_serializing_if = "Option::is_none")]
    pub types: Option<TypeMeta>,
    /// Standard object metadata
    #[serde(default)]
    pub metadata: ObjectMeta,

    /// Name of the broker offering this class
    #[serde(default)]
    pub broker_name: String,
    /// Whether instances of this class can be bound
    #[serde(default)]
    pub bindable: bool,
    /// Plans available for this class
    #[serde(default)]
    pub plans: Vec<ServicePlan>,
    /// Whether instances may switch plans
    #[serde(default)]
    pub plan_updatable: bool,
    /// Broker side identifier
    #[serde(default)]
    pub osb_guid: String,
    /// Broker provided tags
    #[serde(default)]
    pub osb_tags: Vec<String>,
    /// Platform features the class needs
    #[serde(default)]
    pub osb_requires: Vec<String>,
    /// Broker provided placement hint
    #[serde(rename = "osbMaxDBPerNode", default, skip_serializing_if = "Option::is_none")]
    pub osb_max_db_per_node: Option<String>,
    /// Opaque broker metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub osb_metadata: Option<serde_json::Value>,
    /// Human readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A tier of a [`ServiceClass`]
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServicePlan {
    /// Plan name, unique within the class
    pub name: String,
    /// Broker side identifier
    #[serde(default)]
    pub osb_guid: String,
    /// Whether the plan is free of charge
    #[serde(default)]
    pub osb_free: bool,
    /// Human readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Opaque broker metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub osb_metadata: Option<serde_json::Value>,
}

impl ServiceClass {
    /// A new named class offered by `broker_name`
    pub fn new(name: &str, broker_name: &str) -> Self {
        Self {
            types: Some(type_meta("ServiceClass")),
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..ObjectMeta::default()
            },
            broker_name: broker_name.to_string(),
            ..Self::default()
        }
    }

    /// Look up a plan by name
    pub fn plan(&self, name: &str) -> Option<&ServicePlan> {
        self.plans.iter().find(|p| p.name == name)
    }
}

impl_resource!(ServiceClass, NamespaceResourceScope, "ServiceClass", "serviceclasses");

// ----------------------------------------------------------------------------
// Instance
// ----------------------------------------------------------------------------

/// A provisioned instance of a [`ServiceClass`]
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct Instance {
    /// Type information
    #[serde(flatten, default, skip_serializing_if = "Option::is_none")]
    pub types: Option<TypeMeta>,
    /// Standard object metadata
    #[serde(default)]
    pub metadata: ObjectMeta,
    /// Desired state
    pub spec: InstanceSpec,
    /// Observed state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<InstanceStatus>,
}

/// Which class and plan to provision
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InstanceSpec {
    /// Name of the [`ServiceClass`]
    pub service_class_name: String,
    /// Name of the [`ServicePlan`] within the class
    pub plan_name: String,
    /// Opaque provisioning parameters passed to the broker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
    /// Broker side identifier of the instance
    #[serde(default)]
    pub osb_guid: String,
    /// Dashboard of the provisioned service, if the broker returned one
    #[serde(rename = "osbDashboardURL", default, skip_serializing_if = "Option::is_none")]
    pub osb_dashboard_url: Option<String>,
    /// Operation key of the last asynchronous broker operation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub osb_last_operation: Option<String>,
}

/// Observed state of an [`Instance`]
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InstanceStatus {
    /// Latest observations
    #[serde(default)]
    pub conditions: Vec<InstanceCondition>,
    /// Whether an asynchronous broker operation is still running
    #[serde(default)]
    pub async_op_in_progress: bool,
}

impl InstanceStatus {
    /// Whether the instance has been provisioned
    pub fn is_ready(&self) -> bool {
        is_ready(&self.conditions)
    }
}

impl_resource!(Instance, NamespaceResourceScope, "Instance", "instances", InstanceSpec, InstanceStatus);

// ----------------------------------------------------------------------------
// Binding
// ----------------------------------------------------------------------------

/// Credentials for an [`Instance`], delivered as a secret
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct Binding {
    /// Type information
    #[serde(flatten, default, skip_serializing_if = "Option::is_none")]
    pub types: Option<TypeMeta>,
    /// Standard object metadata
    #[serde(default)]
    pub metadata: ObjectMeta,
    /// Desired state
    pub spec: BindingSpec,
    /// Observed state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<BindingStatus>,
}

/// Which instance to bind, and where to put the credentials
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BindingSpec {
    /// The [`Instance`] in the same namespace
    pub instance_ref: LocalObjectReference,
    /// Opaque binding parameters passed to the broker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
    /// Name of the secret the credentials are written to
    pub secret_name: String,
    /// Broker side identifier of the binding
    #[serde(default)]
    pub osb_guid: String,
}

/// Observed state of a [`Binding`]
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BindingStatus {
    /// Latest observations
    #[serde(default)]
    pub conditions: Vec<BindingCondition>,
}

impl BindingStatus {
    /// Whether the credentials have been written
    pub fn is_ready(&self) -> bool {
        is_ready(&self.conditions)
    }
}

impl_resource!(Binding, NamespaceResourceScope, "Binding", "bindings", BindingSpec, BindingStatus);

/// A list of [`Broker`]s
pub type BrokerList = ObjectList<Broker>;
/// A list of [`ServiceClass`]es
pub type ServiceClassList = ObjectList<ServiceClass>;
/// A list of [`Instance`]s
pub type InstanceList = ObjectList<Instance>;
/// A list of [`Binding`]s
pub type BindingList = ObjectList<Binding>;

#[cfg(test)]
mod tests {
    use super::*;
    use assert_json_diff::assert_json_eq;
    use kube::{Resource, ResourceExt};
    use serde_json::json;

    #[test]
    fn resource_paths() {
        assert_eq!(
            Broker::url_path(&(), None),
            "/apis/servicecatalog.k8s.io/v1alpha1/brokers"
        );
        assert_eq!(
            ServiceClass::url_path(&(), Some("ns")),
            "/apis/servicecatalog.k8s.io/v1alpha1/namespaces/ns/serviceclasses"
        );
        assert_eq!(
            Instance::url_path(&(), Some("ns")),
            "/apis/servicecatalog.k8s.io/v1alpha1/namespaces/ns/instances"
        );
        assert_eq!(
            Binding::url_path(&(), Some("ns")),
            "/apis/servicecatalog.k8s.io/v1alpha1/namespaces/ns/bindings"
        );
        assert_eq!(Binding::api_version(&()), API_VERSION);
        assert_eq!(Binding::kind(&()), "Binding");
    }

    #[test]
    fn new_objects_carry_type_information() {
        let broker = Broker::new("ups", BrokerSpec {
            url: "http://ups-broker.brokers".into(),
            auth_secret: None,
        });
        assert_json_eq!(
            serde_json::to_value(&broker).unwrap(),
            json!({
                "apiVersion": "servicecatalog.k8s.io/v1alpha1",
                "kind": "Broker",
                "metadata": { "name": "ups" },
                "spec": { "url": "http://ups-broker.brokers" },
            })
        );
        assert_eq!(broker.name_any(), "ups");
    }

    #[test]
    fn instance_field_names() {
        let instance: Instance = serde_json::from_value(json!({
            "apiVersion": "servicecatalog.k8s.io/v1alpha1",
            "kind": "Instance",
            "metadata": { "name": "db", "namespace": "prod" },
            "spec": {
                "serviceClassName": "postgres",
                "planName": "small",
                "parameters": { "storage": "10Gi" },
                "osbGuid": "1234",
                "osbDashboardURL": "https://dash",
                "osbLastOperation": "op-1",
            },
            "status": {
                "asyncOpInProgress": true,
                "conditions": [{
                    "type": "Ready",
                    "status": "False",
                    "lastTransitionTime": "2017-03-01T12:00:00Z",
                    "reason": "Provisioning",
                    "message": "in progress",
                }],
            },
        }))
        .unwrap();
        assert_eq!(instance.types, Some(type_meta("Instance")));
        assert_eq!(instance.spec().osb_dashboard_url.as_deref(), Some("https://dash"));
        assert_eq!(instance.spec.parameters.as_ref().unwrap()["storage"], "10Gi");
        let status = instance.status().unwrap();
        assert!(status.async_op_in_progress);
        assert!(!status.is_ready());
        assert!(status.conditions[0].last_transition_time.is_some());
    }

    #[test]
    fn unfamiliar_conditions_still_decode() {
        let broker: Broker = serde_json::from_value(json!({
            "metadata": { "name": "ups" },
            "spec": { "url": "http://ups-broker.brokers" },
            "status": {
                "conditions": [
                    { "type": "Failed", "status": "True", "reason": "FetchCatalogFailed" },
                    { "type": "Ready", "status": "Pending" },
                ],
            },
        }))
        .unwrap();
        let status = broker.status().unwrap();
        assert_eq!(status.conditions[0].type_, "Failed");
        assert_eq!(status.conditions[0].status, ConditionStatus::True);
        assert_eq!(status.conditions[1].status, ConditionStatus::Unknown);
        assert!(!status.is_ready());

        // the unfamiliar type is written back untouched
        let value = serde_json::to_value(&broker).unwrap();
        assert_eq!(value["status"]["conditions"][0]["type"], "Failed");
    }

    #[test]
    fn service_class_field_names() {
        let class: ServiceClass = serde_json::from_value(json!({
            "metadata": { "name": "postgres" },
            "brokerName": "ups",
            "bindable": true,
            "planUpdatable": false,
            "osbGuid": "abc",
            "osbTags": ["sql"],
            "osbRequires": [],
            "osbMaxDBPerNode": "5",
            "plans": [
                { "name": "small", "osbGuid": "p1", "osbFree": true },
                { "name": "large", "osbGuid": "p2", "osbFree": false, "description": "big" },
            ],
        }))
        .unwrap();
        assert!(class.types.is_none());
        assert_eq!(class.osb_max_db_per_node.as_deref(), Some("5"));
        assert!(class.plan("small").unwrap().osb_free);
        assert_eq!(class.plan("large").unwrap().description.as_deref(), Some("big"));
        assert!(class.plan("medium").is_none());

        let written = serde_json::to_value(ServiceClass::new("x", "ups")).unwrap();
        assert_eq!(written["kind"], "ServiceClass");
        assert_eq!(written["apiVersion"], API_VERSION);
        assert_eq!(written["brokerName"], "ups");
    }

    #[test]
    fn binding_readiness() {
        let mut binding = Binding::new("creds", BindingSpec {
            instance_ref: LocalObjectReference { name: "db".into() },
            secret_name: "db-creds".into(),
            ..BindingSpec::default()
        });
        assert!(binding.status().is_none());
        *binding.status_mut() = Some(BindingStatus {
            conditions: vec![Condition::ready(ConditionStatus::True)],
        });
        assert!(binding.status().unwrap().is_ready());
        let value = serde_json::to_value(&binding).unwrap();
        assert_eq!(value["spec"]["instanceRef"]["name"], "db");
        assert_eq!(value["spec"]["secretName"], "db-creds");
        assert_eq!(value["status"]["conditions"][0]["type"], "Ready");
        assert_eq!(value["status"]["conditions"][0]["status"], "True");
    }
}
