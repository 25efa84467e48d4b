use tracing::{debug, info, warn};

use spl_store::LedgerStore;
use spl_types::ClassLevel;

use crate::codec::{ClassCodec, SpecContext};
use crate::config::CodecConfig;
use crate::error::{ChaincodeError, ChaincodeResult};
use crate::manager::ProfileManager;
use crate::operation::Operation;
use crate::response::Response;

/// The profile chaincode: routes invoke calls by function name to the
/// profile manager, decoding flat string arguments on the way in.
#[derive(Clone, Debug, Default)]
pub struct ProfileChaincode {
    codec: ClassCodec,
    manager: ProfileManager,
}

impl ProfileChaincode {
    pub fn new(config: CodecConfig) -> ChaincodeResult<Self> {
        Ok(Self {
            codec: ClassCodec::new(config)?,
            manager: ProfileManager::new(),
        })
    }

    pub fn codec(&self) -> &ClassCodec {
        &self.codec
    }

    pub fn manager(&self) -> &ProfileManager {
        &self.manager
    }

    /// Instantiation hook. Touches no state.
    pub fn init(&self, _stub: &dyn LedgerStore) -> Response {
        info!("profile chaincode initialized");
        Response::success(Vec::new())
    }

    /// Run one invocation and fold the outcome into a host response.
    pub fn invoke(&self, stub: &dyn LedgerStore, function: &str, args: &[String]) -> Response {
        match self.execute(stub, function, args) {
            Ok(payload) => Response::success(payload),
            Err(e) => {
                warn!(function, error = %e, "invocation failed");
                Response::error(e.to_string())
            }
        }
    }

    /// Run one invocation, returning the payload bytes or a typed error.
    pub fn execute(
        &self,
        stub: &dyn LedgerStore,
        function: &str,
        args: &[String],
    ) -> ChaincodeResult<Vec<u8>> {
        let op: Operation = function.parse()?;
        let args = op.check_args(args)?;
        debug!(function = op.name(), argc = args.len(), "invoke");

        match op {
            Operation::InitProfile => self.init_profile(stub, args),
            Operation::UpdateProfile => self.update_profile(stub, args),
            Operation::DeleteProfile => self.delete_profile(stub, args),
            Operation::GetProfileById => self.get_profile_by_id(stub, args),
        }
    }

    // args: userID, classSpec, bc
    fn init_profile(&self, stub: &dyn LedgerStore, args: &[String]) -> ChaincodeResult<Vec<u8>> {
        // A duplicate create reports AlreadyExists even when its payload is malformed.
        self.manager.create_with(stub, &args[0], || {
            let class = self.codec.decode_class(&args[1], SpecContext::Create)?;
            Ok((class, self.codec.decode_list(&args[2])))
        })?;
        Ok(Vec::new())
    }

    // args: userID, classSpec, bc, level
    fn update_profile(&self, stub: &dyn LedgerStore, args: &[String]) -> ChaincodeResult<Vec<u8>> {
        // NotFound and Decode take precedence over a malformed class spec.
        let level = ClassLevel::from_selector(&args[3]);
        self.manager.update_with(stub, &args[0], level, || {
            let class = self.codec.decode_class(&args[1], SpecContext::Update)?;
            Ok((class, self.codec.decode_list(&args[2])))
        })?;
        Ok(Vec::new())
    }

    // args: userID
    fn delete_profile(&self, stub: &dyn LedgerStore, args: &[String]) -> ChaincodeResult<Vec<u8>> {
        self.manager.delete(stub, &args[0])?;
        Ok(Vec::new())
    }

    // args: userID
    fn get_profile_by_id(
        &self,
        stub: &dyn LedgerStore,
        args: &[String],
    ) -> ChaincodeResult<Vec<u8>> {
        let results = self.manager.get_by_id(stub, &args[0])?;
        serde_json::to_vec(&results).map_err(|e| ChaincodeError::Encode(e.to_string()))
    }
}
