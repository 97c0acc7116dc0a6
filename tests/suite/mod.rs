mod classifier_wire;
mod config_layering;
mod drawing_flow;
