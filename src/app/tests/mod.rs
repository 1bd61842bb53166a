mod demo_flow;
